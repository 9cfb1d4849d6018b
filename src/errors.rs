use std::time::Duration;

use thiserror::Error;

use crate::wizard::{FieldErrors, StepId};

/// Malformed step registry. Raised while building a wizard, never during navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("wizard must declare at least one step")]
    NoSteps,
    #[error("step id cannot be empty")]
    EmptyStepId,
    #[error("duplicate step id `{0}`")]
    DuplicateStepId(StepId),
    #[error("steps `{first}` and `{second}` share order {order}")]
    DuplicateOrder {
        order: u32,
        first: StepId,
        second: StepId,
    },
    #[error("field `{field}` is collected by both `{first}` and `{second}`")]
    DuplicateField {
        field: String,
        first: StepId,
        second: StepId,
    },
    #[error("field `{nested}` in `{second}` is nested under `{parent}` from `{first}`")]
    OverlappingField {
        parent: String,
        nested: String,
        first: StepId,
        second: StepId,
    },
    #[error("step `{step}` declares an invalid field path `{path}`")]
    InvalidFieldPath { step: StepId, path: String },
    #[error("no step is visible for the initial form values")]
    NoVisibleSteps,
}

/// Programming mistakes surfaced while driving an already-built wizard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid field path `{0}`")]
    InvalidFieldPath(String),
    #[error("form values must be a JSON object")]
    NotAnObject,
    #[error("draft references unknown step `{0}`")]
    UnknownDraftStep(StepId),
}

/// Reasons the engine refused or abandoned a submission.
///
/// A refusal coming from the adapter itself is not an error here; it is passed back as
/// [`SubmissionOutcome::Rejected`](crate::wizard::SubmissionOutcome::Rejected).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    InFlight,
    #[error("step `{step_id}` has {} invalid field(s)", .errors.len())]
    Invalid { step_id: StepId, errors: FieldErrors },
    #[error("submission timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failures reading or writing drafts and settings.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("{0}")]
    Command(String),
}
