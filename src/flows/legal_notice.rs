//! Legal notice publication, priced by word count per publication date.

use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::wizard::{
    DerivedFn, FieldDescriptor, FieldKind, FieldRule, FormValues, Quantity, StepDefinition,
    StepRegistry, TieredPrice, Wizard,
};

pub const CONTENT_FIELD: &str = "notice.content";
pub const DATES_FIELD: &str = "notice.publication_dates";

const NOTICE_TYPES: [&str; 6] = [
    "Public Hearing",
    "Foreclosure",
    "Probate",
    "Name Change",
    "Bid Request",
    "Other",
];

/// Per-publication price: up to 250 words 75, up to 500 words 100, longer 150.
pub fn pricing() -> TieredPrice {
    TieredPrice::new("notice.price", CONTENT_FIELD, Quantity::Words, 150)
        .tier(250, 75)
        .tier(500, 100)
}

/// Price times the number of publication dates, counting at least one run.
pub fn total_price(values: &FormValues) -> u64 {
    let runs = Quantity::Items.count(values.get(DATES_FIELD)).max(1) as u64;
    pricing().price(values) * runs
}

fn check_dates(value: &Value) -> Result<(), String> {
    let Some(items) = value.as_array() else {
        return Ok(());
    };
    for item in items {
        let text = item.as_str().unwrap_or_default();
        if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() {
            return Err(format!("must use YYYY-MM-DD dates (got `{text}`)"));
        }
    }
    Ok(())
}

pub fn registry() -> Result<StepRegistry, ConfigurationError> {
    StepRegistry::register(vec![
        StepDefinition::new("notice_type", "Notice type", 1).with_fields([
            FieldDescriptor::new(
                "notice.type",
                "Notice type",
                FieldKind::Choice(NOTICE_TYPES.iter().map(|t| t.to_string()).collect()),
            ),
            FieldDescriptor::new("notice.case_number", "Case number", FieldKind::Text)
                .with_optional(),
        ]),
        StepDefinition::new("content", "Notice content", 2).with_fields([
            FieldDescriptor::new("notice.title", "Title", FieldKind::Text)
                .with_rule(FieldRule::MaxLength(120)),
            FieldDescriptor::new(CONTENT_FIELD, "Notice text", FieldKind::Text)
                .with_help("Pricing: up to 250 words $75, up to 500 words $100, longer $150.")
                .with_rule(FieldRule::MinWords(5)),
        ]),
        StepDefinition::new("schedule", "Publication schedule", 3).with_field(
            FieldDescriptor::new(DATES_FIELD, "Publication dates", FieldKind::List)
                .with_help("Comma separated, e.g. 2024-05-01, 2024-05-08")
                .with_rule(FieldRule::MinItems(1))
                .with_rule(FieldRule::custom(check_dates)),
        ),
        StepDefinition::new("billing", "Billing contact", 4).with_fields([
            FieldDescriptor::new("billing.contact_name", "Contact name", FieldKind::Text),
            FieldDescriptor::new("billing.contact_email", "Contact email", FieldKind::Text)
                .with_rule(FieldRule::Email),
            FieldDescriptor::new("billing.invoice", "Bill by invoice", FieldKind::Boolean),
        ]),
        StepDefinition::new("payment", "Card payment", 5)
            .visible_when(|values| values.get_bool("billing.invoice") != Some(true))
            .with_fields([
                FieldDescriptor::new("payment.card_number", "Card number", FieldKind::Text)
                    .with_rule(FieldRule::exact_digits(16)),
                FieldDescriptor::new("payment.expiry", "Expiry", FieldKind::Text)
                    .with_rule(FieldRule::CardExpiry),
                FieldDescriptor::new("payment.cvv", "CVV", FieldKind::Text)
                    .with_rule(FieldRule::Digits { min: 3, max: 4 }),
            ]),
        StepDefinition::new("review", "Review", 6).with_field(
            FieldDescriptor::new(
                "notice.attested",
                "Accuracy attestation",
                FieldKind::Boolean,
            )
            .with_rule(FieldRule::Accepted),
        ),
    ])
}

pub fn attach_derived(wizard: Wizard) -> Wizard {
    wizard
        .with_derived(DerivedFn::count("notice.word_count", CONTENT_FIELD, Quantity::Words))
        .with_derived(pricing())
        .with_derived(DerivedFn::new("notice.total", |values| {
            Value::from(total_price(values))
        }))
}
