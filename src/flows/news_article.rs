use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::wizard::{
    DerivedFn, FieldDescriptor, FieldErrors, FieldKind, FieldRule, FormValues, Quantity,
    StepDefinition, StepRegistry, Wizard,
};

use super::url_rule;

pub const BODY_FIELD: &str = "article.body";
pub const WORDS_PER_MINUTE: usize = 200;

const CATEGORIES: [&str; 5] = ["News", "Sports", "Business", "Opinion", "Events"];

fn is_event(values: &FormValues) -> bool {
    values.get_str("article.category") == Some("Events")
}

/// A caption makes no sense without the image it describes.
fn caption_needs_image(values: &FormValues) -> FieldErrors {
    let has_caption = values
        .get_str("article.caption")
        .is_some_and(|caption| !caption.trim().is_empty());
    let has_image = values
        .get_str("article.image_url")
        .is_some_and(|url| !url.trim().is_empty());
    let mut errors = FieldErrors::new();
    if has_caption && !has_image {
        errors.insert(
            "article.image_url",
            "Image URL is required when a caption is set",
        );
    }
    errors
}

pub fn reading_minutes(words: usize) -> usize {
    if words == 0 {
        0
    } else {
        words.div_ceil(WORDS_PER_MINUTE)
    }
}

pub fn registry() -> Result<StepRegistry, ConfigurationError> {
    StepRegistry::register(vec![
        StepDefinition::new("category", "Category", 1).with_fields([
            FieldDescriptor::new(
                "article.category",
                "Category",
                FieldKind::Choice(CATEGORIES.iter().map(|c| c.to_string()).collect()),
            ),
            FieldDescriptor::new("article.headline", "Headline", FieldKind::Text)
                .with_rule(FieldRule::MinLength(10))
                .with_rule(FieldRule::MaxLength(100)),
        ]),
        StepDefinition::new("content", "Story", 2).with_fields([
            FieldDescriptor::new(BODY_FIELD, "Story text", FieldKind::Text)
                .with_rule(FieldRule::MinWords(20)),
            FieldDescriptor::new("article.summary", "Summary", FieldKind::Text)
                .with_optional()
                .with_rule(FieldRule::MaxLength(280)),
        ]),
        StepDefinition::new("media", "Media", 3)
            .with_fields([
                FieldDescriptor::new("article.image_url", "Image URL", FieldKind::Text)
                    .with_optional()
                    .with_rule(url_rule()),
                FieldDescriptor::new("article.caption", "Caption", FieldKind::Text)
                    .with_optional()
                    .with_rule(FieldRule::MaxLength(200)),
            ])
            .with_validator(caption_needs_image),
        StepDefinition::new("event_details", "Event details", 4)
            .visible_when(is_event)
            .with_fields([
                FieldDescriptor::new("event.date", "Event date", FieldKind::Date),
                FieldDescriptor::new("event.venue", "Venue", FieldKind::Text),
                FieldDescriptor::new("event.ticket_url", "Ticket link", FieldKind::Text)
                    .with_optional()
                    .with_rule(url_rule()),
            ]),
        StepDefinition::new("review", "Review", 5).with_field(
            FieldDescriptor::new(
                "article.original_work",
                "Original work confirmation",
                FieldKind::Boolean,
            )
            .with_rule(FieldRule::Accepted),
        ),
    ])
}

pub fn attach_derived(wizard: Wizard) -> Wizard {
    wizard
        .with_derived(DerivedFn::count("article.word_count", BODY_FIELD, Quantity::Words))
        .with_derived(DerivedFn::new("article.reading_minutes", |values| {
            Value::from(reading_minutes(Quantity::Words.count(values.get(BODY_FIELD))))
        }))
}
