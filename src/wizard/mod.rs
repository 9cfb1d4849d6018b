//! Generic multi-step wizard engine.
//!
//! A wizard is an ordered [`StepRegistry`] of [`StepDefinition`]s plus the [`FormValues`]
//! collected so far. Steps can be hidden by a predicate over the values; hidden steps are
//! skipped by navigation and ignored by the submit gate.

pub mod derived;
pub mod draft;
pub mod engine;
pub mod navigation;
pub mod registry;
pub mod state;
pub mod step;
pub mod submission;
pub mod validation;
pub mod values;

pub use derived::{DerivedCalculator, DerivedField, DerivedFn, PriceTier, Quantity, TieredPrice};
pub use draft::{Draft, DraftStore, JsonDraftStore};
pub use engine::Wizard;
pub use navigation::{NavigationError, NavigationOutcome};
pub use registry::StepRegistry;
pub use state::{FormState, StepProgress, StepStatus};
pub use step::{FieldDescriptor, FieldKind, FieldRule, StepDefinition, StepId};
pub use submission::{SubmissionAdapter, SubmissionOutcome, SubmitFn};
pub use validation::FieldErrors;
pub use values::{display_value, FieldPath, FormValues};
