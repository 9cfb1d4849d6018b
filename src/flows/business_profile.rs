//! Business directory listing: the only flow with an optional paid step.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::wizard::{
    DerivedFn, FieldDescriptor, FieldKind, FieldRule, StepDefinition, StepRegistry, Wizard,
};

use super::url_rule;

pub const PREMIUM_MONTHLY_PRICE: u64 = 29;

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9()\-.\s]{7,20}$").expect("valid phone pattern"));
static STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("valid state pattern"));
static ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip pattern"));

const CATEGORIES: [&str; 6] = [
    "Restaurant",
    "Retail",
    "Services",
    "Health",
    "Entertainment",
    "Other",
];

pub fn registry() -> Result<StepRegistry, ConfigurationError> {
    StepRegistry::register(vec![
        StepDefinition::new("basics", "Business basics", 1).with_fields([
            FieldDescriptor::new("business.name", "Business name", FieldKind::Text)
                .with_rule(FieldRule::MaxLength(80)),
            FieldDescriptor::new(
                "business.category",
                "Category",
                FieldKind::Choice(CATEGORIES.iter().map(|c| c.to_string()).collect()),
            ),
            FieldDescriptor::new("business.description", "Description", FieldKind::Text)
                .with_optional()
                .with_help("A short pitch shown on the listing card.")
                .with_rule(FieldRule::MaxWords(150)),
        ]),
        StepDefinition::new("contact", "Contact details", 2).with_fields([
            FieldDescriptor::new("contact.email", "Email", FieldKind::Text)
                .with_rule(FieldRule::Email),
            FieldDescriptor::new("contact.phone", "Phone", FieldKind::Text).with_rule(
                FieldRule::Pattern(PHONE.clone(), "must be a valid phone number"),
            ),
            FieldDescriptor::new("contact.address.street", "Street", FieldKind::Text),
            FieldDescriptor::new("contact.address.city", "City", FieldKind::Text),
            FieldDescriptor::new("contact.address.state", "State", FieldKind::Text)
                .with_rule(FieldRule::Pattern(STATE.clone(), "must be a two-letter code")),
            FieldDescriptor::new("contact.address.zip", "ZIP code", FieldKind::Text)
                .with_rule(FieldRule::Pattern(ZIP.clone(), "must be 5 digits (or ZIP+4)")),
            FieldDescriptor::new("contact.website", "Website", FieldKind::Text)
                .with_optional()
                .with_rule(url_rule()),
        ]),
        StepDefinition::new("hours", "Opening hours", 3).with_fields([
            FieldDescriptor::new("hours.weekdays", "Weekday hours", FieldKind::Text)
                .with_help("e.g. 9am-5pm"),
            FieldDescriptor::new("hours.weekends", "Weekend hours", FieldKind::Text)
                .with_optional(),
        ]),
        StepDefinition::new("plan", "Listing plan", 4).with_field(
            FieldDescriptor::new("plan.premium", "Premium listing", FieldKind::Boolean)
                .with_help("Premium listings are featured in search results."),
        ),
        StepDefinition::new("payment", "Payment", 5)
            .visible_when_flag("plan.premium")
            .with_fields([
                FieldDescriptor::new("payment.card_name", "Name on card", FieldKind::Text),
                FieldDescriptor::new("payment.card_number", "Card number", FieldKind::Text)
                    .with_rule(FieldRule::exact_digits(16)),
                FieldDescriptor::new("payment.expiry", "Expiry", FieldKind::Text)
                    .with_help("MM/YY")
                    .with_rule(FieldRule::CardExpiry),
                FieldDescriptor::new("payment.cvv", "CVV", FieldKind::Text)
                    .with_rule(FieldRule::Digits { min: 3, max: 4 }),
            ]),
        StepDefinition::new("review", "Review", 6).with_field(
            FieldDescriptor::new("terms.accepted", "Terms of service", FieldKind::Boolean)
                .with_rule(FieldRule::Accepted),
        ),
    ])
}

pub fn attach_derived(wizard: Wizard) -> Wizard {
    wizard.with_derived(DerivedFn::new("plan.monthly_price", |values| {
        let price = if values.get_bool("plan.premium") == Some(true) {
            PREMIUM_MONTHLY_PRICE
        } else {
            0
        };
        Value::from(price)
    }))
}
