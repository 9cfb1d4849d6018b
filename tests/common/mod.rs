#![allow(dead_code)]

use wizard_core::wizard::{
    FieldDescriptor, FieldKind, StepDefinition, StepRegistry, Wizard,
};

/// Info, Payment (only when `isPremium` is true), Review.
pub fn premium_registry() -> StepRegistry {
    StepRegistry::register(vec![
        StepDefinition::new("info", "Info", 1).with_field(FieldDescriptor::new(
            "name",
            "Name",
            FieldKind::Text,
        )),
        StepDefinition::new("payment", "Payment", 2)
            .visible_when_flag("isPremium")
            .with_field(FieldDescriptor::new(
                "payment.card",
                "Card number",
                FieldKind::Text,
            )),
        StepDefinition::new("review", "Review", 3),
    ])
    .expect("valid registry")
}

pub fn premium_wizard() -> Wizard {
    Wizard::new(premium_registry()).expect("at least one visible step")
}

pub fn step_ids(wizard: &Wizard) -> Vec<String> {
    wizard
        .visible_steps()
        .iter()
        .map(|step| step.id().as_str().to_string())
        .collect()
}
