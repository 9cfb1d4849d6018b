use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::wizard::{
    DerivedFn, FieldDescriptor, FieldKind, FieldRule, Quantity, StepDefinition, StepRegistry,
    Wizard,
};

static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time pattern"));

pub const COMMUNITIES_FIELD: &str = "deployment.communities";
pub const SCHEDULE_FIELD: &str = "deployment.schedule";

pub fn registry() -> Result<StepRegistry, ConfigurationError> {
    StepRegistry::register(vec![
        StepDefinition::new("communities", "Target communities", 1).with_field(
            FieldDescriptor::new(COMMUNITIES_FIELD, "Communities", FieldKind::List)
                .with_help("Comma separated community names")
                .with_rule(FieldRule::MinItems(1)),
        ),
        StepDefinition::new("configuration", "Configuration", 2).with_fields([
            FieldDescriptor::new("deployment.title", "Deployment title", FieldKind::Text),
            FieldDescriptor::new(
                SCHEDULE_FIELD,
                "Schedule",
                FieldKind::Choice(vec!["Immediate".into(), "Scheduled".into()]),
            ),
        ]),
        StepDefinition::new("schedule", "Schedule", 3)
            .visible_when(|values| values.get_str(SCHEDULE_FIELD) == Some("Scheduled"))
            .with_fields([
                FieldDescriptor::new("deployment.publish_date", "Publish date", FieldKind::Date),
                FieldDescriptor::new("deployment.publish_time", "Publish time", FieldKind::Text)
                    .with_help("24h clock, HH:MM")
                    .with_rule(FieldRule::Pattern(TIME.clone(), "must use HH:MM (24h)")),
            ]),
        StepDefinition::new("review", "Review", 4).with_field(
            FieldDescriptor::new("deployment.confirmed", "Deployment confirmation", FieldKind::Boolean)
                .with_rule(FieldRule::Accepted),
        ),
    ])
}

pub fn attach_derived(wizard: Wizard) -> Wizard {
    wizard.with_derived(DerivedFn::new("deployment.community_count", |values| {
        Value::from(Quantity::Items.count(values.get(COMMUNITIES_FIELD)))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::NavigationOutcome;
    use serde_json::json;

    #[test]
    fn leaving_scheduled_mode_renavigates() {
        let mut wizard = attach_derived(Wizard::new(registry().unwrap()).unwrap());
        wizard
            .set(COMMUNITIES_FIELD, json!(["Clearwater", "Dunedin"]))
            .unwrap();
        assert_eq!(
            wizard.derived_value("deployment.community_count"),
            Some(json!(2))
        );
        assert!(wizard.advance().moved());

        wizard
            .set_many([("deployment.title", "Spring launch"), (SCHEDULE_FIELD, "Scheduled")])
            .unwrap();
        assert!(wizard.advance().moved());
        assert_eq!(wizard.current_step_id().as_str(), "schedule");

        wizard.set(SCHEDULE_FIELD, "Immediate").unwrap();
        assert_eq!(wizard.current_step_id().as_str(), "configuration");
        assert_eq!(
            wizard.advance(),
            NavigationOutcome::Moved {
                from: "configuration".into(),
                to: "review".into(),
            }
        );
    }
}
