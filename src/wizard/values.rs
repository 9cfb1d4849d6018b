//! Dot-path addressed value tree holding everything a wizard has collected.
//!
//! Field keys such as `contact.address.city` address nested JSON objects. Writes create
//! the intermediate objects on demand so a form never has to spread parent objects by hand.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::WizardError;

/// Parsed dot-separated field key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(key: &str) -> Result<Self, WizardError> {
        let malformed = |segment: &str| segment.is_empty() || segment.trim() != segment;
        if key.split('.').any(malformed) {
            return Err(WizardError::InvalidFieldPath(key.to_string()));
        }
        Ok(Self {
            segments: key.split('.').map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// The values collected so far, as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(Map<String, Value>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object, e.g. a pre-filled draft payload.
    pub fn from_json(value: Value) -> Result<Self, WizardError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(WizardError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let path = FieldPath::parse(key).ok()?;
        self.get_path(&path)
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (head, rest) = path.segments().split_first()?;
        rest.iter()
            .try_fold(self.0.get(head)?, |value, segment| value.get(segment))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Writes `value` at `key`, replacing any non-object found along the way.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        let path = FieldPath::parse(key)?;
        write_path(&mut self.0, path.segments(), value.into());
        Ok(())
    }

    /// Applies several writes. Every key is parsed before anything is written, so a bad
    /// key leaves the values untouched.
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<(), WizardError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let parsed = entries
            .into_iter()
            .map(|(key, value)| FieldPath::parse(key.as_ref()).map(|path| (path, value.into())))
            .collect::<Result<Vec<_>, _>>()?;
        for (path, value) in parsed {
            write_path(&mut self.0, path.segments(), value);
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let path = FieldPath::parse(key).ok()?;
        let (last, parents) = path.segments().split_last()?;
        let mut map = &mut self.0;
        for segment in parents {
            map = map.get_mut(segment)?.as_object_mut()?;
        }
        map.remove(last)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }
}

fn write_path(map: &mut Map<String, Value>, segments: &[String], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert(last.clone(), value);
        }
        [head, rest @ ..] => {
            let slot = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                write_path(child, rest, value);
            }
        }
    }
}

/// Renders a value the way summaries and prompts show it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "yes".into(),
        Value::Bool(false) => "no".into(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
