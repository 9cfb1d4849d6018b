//! Visible-step search used by the navigation controller.
//!
//! Positions are resolved by `order` against the full registry on every call, so a step
//! that was hidden a moment ago is picked up as soon as its predicate turns true.

use thiserror::Error;

use super::registry::StepRegistry;
use super::step::{StepDefinition, StepId};
use super::validation::FieldErrors;
use super::values::FormValues;

/// A transition that was not allowed. Returned as data; the current step is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("unknown step `{0}`")]
    UnknownStep(StepId),
    #[error("step `{0}` is not currently visible")]
    HiddenStep(StepId),
}

/// Result of `advance`, `retreat` or `jump_to`.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Moved { from: StepId, to: StepId },
    /// Nothing to move to (e.g. `retreat` on the first visible step).
    Stayed,
    /// The current step validated and no visible step follows it.
    ReadyToSubmit,
    /// The current step has errors; the wizard did not move.
    Invalid(FieldErrors),
    Rejected(NavigationError),
}

impl NavigationOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, NavigationOutcome::Moved { .. })
    }
}

pub fn first_visible<'a>(
    registry: &'a StepRegistry,
    values: &FormValues,
) -> Option<&'a StepDefinition> {
    registry.steps().iter().find(|step| step.is_visible(values))
}

/// First visible step ordered after `order`.
pub fn next_visible<'a>(
    registry: &'a StepRegistry,
    values: &FormValues,
    order: u32,
) -> Option<&'a StepDefinition> {
    registry
        .steps()
        .iter()
        .filter(|step| step.order() > order)
        .find(|step| step.is_visible(values))
}

/// Last visible step ordered before `order`.
pub fn previous_visible<'a>(
    registry: &'a StepRegistry,
    values: &FormValues,
    order: u32,
) -> Option<&'a StepDefinition> {
    registry
        .steps()
        .iter()
        .rev()
        .filter(|step| step.order() < order)
        .find(|step| step.is_visible(values))
}

/// Where to land when the step at `order` is no longer visible: the nearest preceding
/// visible step, else the first visible one.
pub fn nearest_visible<'a>(
    registry: &'a StepRegistry,
    values: &FormValues,
    order: u32,
) -> Option<&'a StepDefinition> {
    previous_visible(registry, values, order).or_else(|| first_visible(registry, values))
}
