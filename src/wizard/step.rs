//! Declarative step and field descriptions.
//!
//! A wizard is an ordered list of [`StepDefinition`]s. Each step owns a set of fields,
//! an optional visibility predicate and an optional cross-field validator. Concrete
//! wizards plug into the engine by describing their steps with the builders below.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{self, FieldErrors};
use super::values::FormValues;

/// Stable identifier of a step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&StepId> for StepId {
    fn from(value: &StepId) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Supported data kinds for form fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    Boolean,
    Choice(Vec<String>),
    List,
}

impl FieldKind {
    /// Converts raw prompt input into a value of this kind. Blank input clears the field.
    pub fn parse_input(&self, raw: &str) -> Result<Value, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(match self {
                FieldKind::List => Value::Array(Vec::new()),
                _ => Value::Null,
            });
        }
        match self {
            FieldKind::Text => Ok(Value::String(trimmed.to_string())),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Enter a whole number (e.g., 42)".to_string()),
            FieldKind::Decimal => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "Enter a numeric value".to_string()),
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(|date| Value::String(date.to_string()))
                .map_err(|_| "Use YYYY-MM-DD format".to_string()),
            FieldKind::Boolean => match trimmed.to_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(Value::Bool(true)),
                "n" | "no" | "false" | "0" => Ok(Value::Bool(false)),
                _ => Err("Enter yes/no, true/false, or 1/0".to_string()),
            },
            FieldKind::Choice(options) => {
                let by_index = trimmed
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| index.checked_sub(1))
                    .and_then(|index| options.get(index));
                by_index
                    .or_else(|| {
                        options
                            .iter()
                            .find(|option| option.eq_ignore_ascii_case(trimmed))
                    })
                    .map(|option| Value::String(option.clone()))
                    .ok_or_else(|| format!("Value must be one of: {}", options.join(", ")))
            }
            FieldKind::List => Ok(Value::Array(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
        }
    }

    /// Type check for a present value.
    pub(crate) fn check(&self, label: &str, value: &Value) -> Result<(), String> {
        let ok = match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Decimal => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::List => value.is_array(),
            FieldKind::Date => {
                return value
                    .as_str()
                    .and_then(|text| NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok())
                    .map(|_| ())
                    .ok_or_else(|| format!("{label} must be a date (YYYY-MM-DD)"));
            }
            FieldKind::Choice(options) => {
                return value
                    .as_str()
                    .filter(|text| options.iter().any(|option| option == text))
                    .map(|_| ())
                    .ok_or_else(|| {
                        format!("{label} must be one of: {}", options.join(", "))
                    });
            }
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{label} has the wrong type"))
        }
    }
}

type RuleCallback = dyn Fn(&Value) -> Result<(), String> + Send + Sync;
pub type SharedRule = Arc<RuleCallback>;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static EXPIRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("valid expiry pattern"));

/// Format rules applied to a present value, after the required check.
#[derive(Clone)]
pub enum FieldRule {
    Email,
    /// Digits only (spaces ignored), length within `min..=max`.
    Digits {
        min: usize,
        max: usize,
    },
    /// `MM/YY`.
    CardExpiry,
    Pattern(Regex, &'static str),
    MinLength(usize),
    MaxLength(usize),
    MinWords(usize),
    MaxWords(usize),
    MinItems(usize),
    /// Checkbox that has to be ticked.
    Accepted,
    Custom(SharedRule),
}

impl FieldRule {
    pub fn exact_digits(len: usize) -> Self {
        FieldRule::Digits { min: len, max: len }
    }

    pub fn pattern(pattern: &str, message: &'static str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(|regex| FieldRule::Pattern(regex, message))
    }

    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        FieldRule::Custom(Arc::new(check))
    }

    pub(crate) fn check(&self, label: &str, value: &Value) -> Result<(), String> {
        let text = value.as_str().map(str::trim).unwrap_or_default();
        match self {
            FieldRule::Email => {
                if EMAIL_PATTERN.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("{label} must be a valid email address"))
                }
            }
            FieldRule::Digits { min, max } => {
                let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                let len = digits.chars().count();
                if digits.chars().all(|c| c.is_ascii_digit()) && len >= *min && len <= *max {
                    Ok(())
                } else if min == max {
                    Err(format!("{label} must be exactly {min} digits"))
                } else {
                    Err(format!("{label} must be {min} to {max} digits"))
                }
            }
            FieldRule::CardExpiry => {
                if EXPIRY_PATTERN.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("{label} must use MM/YY format"))
                }
            }
            FieldRule::Pattern(regex, message) => {
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("{label} {message}"))
                }
            }
            FieldRule::MinLength(min) => {
                if text.chars().count() >= *min {
                    Ok(())
                } else {
                    Err(format!("{label} must be at least {min} characters"))
                }
            }
            FieldRule::MaxLength(max) => {
                let len = text.chars().count();
                if len <= *max {
                    Ok(())
                } else {
                    Err(format!("{label} cannot exceed {max} characters (got {len})"))
                }
            }
            FieldRule::MinWords(min) => {
                if text.split_whitespace().count() >= *min {
                    Ok(())
                } else {
                    Err(format!("{label} must be at least {min} words"))
                }
            }
            FieldRule::MaxWords(max) => {
                let words = text.split_whitespace().count();
                if words <= *max {
                    Ok(())
                } else {
                    Err(format!("{label} cannot exceed {max} words (got {words})"))
                }
            }
            FieldRule::MinItems(min) => {
                let count = value.as_array().map(Vec::len).unwrap_or_default();
                if count >= *min {
                    Ok(())
                } else {
                    Err(format!("{label} needs at least {min} item(s)"))
                }
            }
            FieldRule::Accepted => {
                if value.as_bool() == Some(true) {
                    Ok(())
                } else {
                    Err(format!("{label} must be accepted"))
                }
            }
            FieldRule::Custom(check) => check(value).map_err(|message| format!("{label} {message}")),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Email => f.write_str("Email"),
            FieldRule::Digits { min, max } => write!(f, "Digits({min}..={max})"),
            FieldRule::CardExpiry => f.write_str("CardExpiry"),
            FieldRule::Pattern(regex, _) => write!(f, "Pattern({})", regex.as_str()),
            FieldRule::MinLength(n) => write!(f, "MinLength({n})"),
            FieldRule::MaxLength(n) => write!(f, "MaxLength({n})"),
            FieldRule::MinWords(n) => write!(f, "MinWords({n})"),
            FieldRule::MaxWords(n) => write!(f, "MaxWords({n})"),
            FieldRule::MinItems(n) => write!(f, "MinItems({n})"),
            FieldRule::Accepted => f.write_str("Accepted"),
            FieldRule::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Declarative description of a single form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
    pub rules: Vec<FieldRule>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
            rules: Vec::new(),
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Decides whether a step takes part in the flow for the current values.
/// Must be deterministic in the values it is given.
pub type VisibilityPredicate = Arc<dyn Fn(&FormValues) -> bool + Send + Sync>;

/// Cross-field validation for a whole step.
pub type StepValidator = Arc<dyn Fn(&FormValues) -> FieldErrors + Send + Sync>;

/// One page of a wizard.
#[derive(Clone)]
pub struct StepDefinition {
    id: StepId,
    title: String,
    order: u32,
    fields: Vec<FieldDescriptor>,
    visibility: Option<VisibilityPredicate>,
    validator: Option<StepValidator>,
}

impl StepDefinition {
    pub fn new(id: impl Into<StepId>, title: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order,
            fields: Vec::new(),
            visibility: None,
            validator: None,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        self.visibility = Some(Arc::new(predicate));
        self
    }

    /// Shown only while the boolean at `key` is `true`.
    pub fn visible_when_flag(self, key: &'static str) -> Self {
        self.visible_when(move |values| values.get_bool(key) == Some(true))
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FormValues) -> FieldErrors + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn id(&self) -> &StepId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn is_visible(&self, values: &FormValues) -> bool {
        self.visibility
            .as_ref()
            .map_or(true, |predicate| predicate(values))
    }

    /// Field checks first, then the step validator for fields that are still clean.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = validation::validate_fields(&self.fields, values);
        if let Some(validator) = &self.validator {
            errors.merge(validator(values));
        }
        errors
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("order", &self.order)
            .field("fields", &self.fields)
            .field("conditional", &self.visibility.is_some())
            .finish()
    }
}
