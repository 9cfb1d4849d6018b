//! Validator engine. Everything here is a pure function of the step definition and the
//! values handed in, so results can be recomputed at any time.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::registry::StepRegistry;
use super::step::{FieldDescriptor, StepId};
use super::values::FormValues;

/// Field key to message. A step is valid iff this is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(field, message);
        self
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Missing means absent, `null`, blank string, or empty list.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// First problem with a single field, if any. Format checks only run once the value is
/// present, so an empty required field reports "required" and nothing else.
pub fn check_field(field: &FieldDescriptor, values: &FormValues) -> Option<String> {
    let value = values.get(field.key);
    let value = match value {
        Some(value) if !is_missing(Some(value)) => value,
        _ => {
            return field
                .required
                .then(|| format!("{} is required", field.label));
        }
    };

    if let Err(message) = field.kind.check(field.label, value) {
        return Some(message);
    }
    field
        .rules
        .iter()
        .find_map(|rule| rule.check(field.label, value).err())
}

pub fn validate_fields(fields: &[FieldDescriptor], values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields {
        if let Some(message) = check_field(field, values) {
            errors.insert(field.key, message);
        }
    }
    errors
}

/// Validates one step by id. `None` when the registry has no such step.
pub fn validate_step(
    registry: &StepRegistry,
    step_id: &StepId,
    values: &FormValues,
) -> Option<FieldErrors> {
    registry.step(step_id).map(|step| step.validate(values))
}

/// Every visible step that fails validation, in step order. Hidden steps are ignored.
pub fn invalid_visible_steps(
    registry: &StepRegistry,
    values: &FormValues,
) -> Vec<(StepId, FieldErrors)> {
    registry
        .visible_steps(values)
        .into_iter()
        .filter_map(|step| {
            let errors = step.validate(values);
            (!errors.is_valid()).then(|| (step.id().clone(), errors))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::step::{FieldKind, FieldRule, StepDefinition};
    use serde_json::json;

    fn card_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("payment.card_number", "Card number", FieldKind::Text)
                .with_rule(FieldRule::exact_digits(16)),
            FieldDescriptor::new("payment.expiry", "Expiry", FieldKind::Text)
                .with_rule(FieldRule::CardExpiry),
            FieldDescriptor::new("payment.note", "Note", FieldKind::Text)
                .with_optional()
                .with_rule(FieldRule::MaxLength(5)),
        ]
    }

    #[test]
    fn missing_convention() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!("   "))));
        assert!(is_missing(Some(&json!([]))));
        assert!(!is_missing(Some(&json!(false))));
        assert!(!is_missing(Some(&json!(0))));
    }

    #[test]
    fn empty_required_field_reports_required_only() {
        let errors = validate_fields(&card_fields(), &FormValues::new());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("payment.card_number"), Some("Card number is required"));
        assert_eq!(errors.get("payment.expiry"), Some("Expiry is required"));
        assert!(errors.get("payment.note").is_none());
    }

    #[test]
    fn malformed_values_report_format_errors() {
        let mut values = FormValues::new();
        values.set("payment.card_number", "4111").unwrap();
        values.set("payment.expiry", "12/30").unwrap();
        values.set("payment.note", "too long").unwrap();

        let errors = validate_fields(&card_fields(), &values);
        assert_eq!(
            errors.get("payment.card_number"),
            Some("Card number must be exactly 16 digits")
        );
        assert!(errors.get("payment.expiry").is_none());
        assert_eq!(
            errors.get("payment.note"),
            Some("Note cannot exceed 5 characters (got 8)")
        );
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let field = FieldDescriptor::new("plan.premium", "Premium", FieldKind::Boolean);
        let mut values = FormValues::new();
        values.set("plan.premium", "yes").unwrap();
        assert_eq!(
            check_field(&field, &values).as_deref(),
            Some("Premium has the wrong type")
        );
    }

    #[test]
    fn step_validator_does_not_override_field_messages() {
        let step = StepDefinition::new("media", "Media", 1)
            .with_field(FieldDescriptor::new("image", "Image", FieldKind::Text))
            .with_validator(|_| {
                FieldErrors::new()
                    .with("image", "from step")
                    .with("caption", "Caption needs an image")
            });

        let errors = step.validate(&FormValues::new());
        assert_eq!(errors.get("image"), Some("Image is required"));
        assert_eq!(errors.get("caption"), Some("Caption needs an image"));
    }
}
