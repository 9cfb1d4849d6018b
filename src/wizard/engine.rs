//! The wizard engine: one registry, one form state, navigation and submission around them.

use std::collections::BTreeMap;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{ConfigurationError, SubmitError, WizardError};

use super::derived::{DerivedCalculator, DerivedField};
use super::draft::Draft;
use super::navigation::{self, NavigationError, NavigationOutcome};
use super::registry::StepRegistry;
use super::state::{FormState, StepProgress, StepStatus};
use super::step::{StepDefinition, StepId};
use super::submission::{InFlightGuard, SubmissionAdapter, SubmissionOutcome};
use super::validation::{self, FieldErrors};
use super::values::FormValues;

/// A running multi-step form.
///
/// The active step is always one whose visibility predicate holds for the current values:
/// every write re-checks it and moves back to the nearest visible step when needed.
#[derive(Debug)]
pub struct Wizard {
    registry: StepRegistry,
    state: FormState,
    derived: DerivedCalculator,
    submitting: AtomicBool,
    submission_timeout: Option<Duration>,
}

impl Wizard {
    pub fn new(registry: StepRegistry) -> Result<Self, ConfigurationError> {
        Self::with_values(registry, FormValues::new())
    }

    /// Starts on the first step visible for the pre-filled `values`.
    pub fn with_values(
        registry: StepRegistry,
        values: FormValues,
    ) -> Result<Self, ConfigurationError> {
        let first = navigation::first_visible(&registry, &values)
            .ok_or(ConfigurationError::NoVisibleSteps)?
            .id()
            .clone();
        debug!(step = %first, "wizard started");
        Ok(Self::from_parts(registry, FormState::new(values, first)))
    }

    /// Restores a saved draft. A draft whose step is now hidden resumes on the nearest
    /// visible step.
    pub fn from_draft(registry: StepRegistry, draft: Draft) -> Result<Self, WizardError> {
        if !registry.contains(&draft.current_step_id) {
            return Err(WizardError::UnknownDraftStep(draft.current_step_id));
        }
        let visited = draft
            .visited_step_ids
            .into_iter()
            .filter(|id| registry.contains(id))
            .collect();
        let state = FormState {
            values: draft.values,
            current_step_id: draft.current_step_id,
            visited_step_ids: visited,
        };
        if navigation::first_visible(&registry, &state.values).is_none() {
            return Err(ConfigurationError::NoVisibleSteps.into());
        }
        let mut wizard = Self::from_parts(registry, state);
        wizard.ensure_current_visible();
        debug!(flow = %draft.flow, step = %wizard.state.current_step_id, "draft restored");
        Ok(wizard)
    }

    fn from_parts(registry: StepRegistry, state: FormState) -> Self {
        Self {
            registry,
            state,
            derived: DerivedCalculator::new(),
            submitting: AtomicBool::new(false),
            submission_timeout: None,
        }
    }

    pub fn with_derived(mut self, field: impl DerivedField + 'static) -> Self {
        self.derived.push(field);
        self
    }

    pub fn with_submission_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.submission_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn current_step_id(&self) -> &StepId {
        &self.state.current_step_id
    }

    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.registry.step(&self.state.current_step_id)
    }

    pub fn visible_steps(&self) -> Vec<&StepDefinition> {
        self.registry.visible_steps(&self.state.values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        self.state.values.set(key, value)?;
        debug!(field = key, "field updated");
        self.ensure_current_visible();
        Ok(())
    }

    /// Applies every write before visibility is re-checked once.
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<(), WizardError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.state.values.set_many(entries)?;
        debug!("fields updated");
        self.ensure_current_visible();
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.state.values.remove(key);
        if removed.is_some() {
            debug!(field = key, "field cleared");
            self.ensure_current_visible();
        }
        removed
    }

    fn ensure_current_visible(&mut self) {
        let Some(current) = self.registry.step(&self.state.current_step_id) else {
            return;
        };
        if current.is_visible(&self.state.values) {
            return;
        }
        match navigation::nearest_visible(&self.registry, &self.state.values, current.order()) {
            Some(target) => {
                warn!(
                    from = %current.id(),
                    to = %target.id(),
                    "active step is no longer visible; renavigating"
                );
                self.state.current_step_id = target.id().clone();
            }
            None => warn!(
                step = %current.id(),
                "active step is hidden and no other step is visible"
            ),
        }
    }

    pub fn validate_step(&self, step_id: &StepId) -> Option<FieldErrors> {
        validation::validate_step(&self.registry, step_id, &self.state.values)
    }

    pub fn validate_current(&self) -> FieldErrors {
        self.validate_step(&self.state.current_step_id)
            .unwrap_or_default()
    }

    /// First visible step that fails validation, if any.
    pub fn first_invalid_step(&self) -> Option<(StepId, FieldErrors)> {
        validation::invalid_visible_steps(&self.registry, &self.state.values)
            .into_iter()
            .next()
    }

    pub fn can_submit(&self) -> bool {
        self.first_invalid_step().is_none()
    }

    /// Validates the active step and moves to the next visible one.
    pub fn advance(&mut self) -> NavigationOutcome {
        let Some(current) = self.registry.step(&self.state.current_step_id) else {
            return NavigationOutcome::Rejected(NavigationError::UnknownStep(
                self.state.current_step_id.clone(),
            ));
        };
        let errors = current.validate(&self.state.values);
        if !errors.is_valid() {
            debug!(step = %current.id(), errors = errors.len(), "advance blocked");
            return NavigationOutcome::Invalid(errors);
        }
        self.state.visited_step_ids.insert(current.id().clone());

        match navigation::next_visible(&self.registry, &self.state.values, current.order()) {
            Some(next) => {
                let to = next.id().clone();
                let from = mem::replace(&mut self.state.current_step_id, to.clone());
                debug!(%from, %to, "advanced");
                NavigationOutcome::Moved { from, to }
            }
            None => {
                debug!(step = %current.id(), "last visible step complete");
                NavigationOutcome::ReadyToSubmit
            }
        }
    }

    /// Moves to the previous visible step. Never validates.
    pub fn retreat(&mut self) -> NavigationOutcome {
        let Some(current) = self.registry.step(&self.state.current_step_id) else {
            return NavigationOutcome::Stayed;
        };
        match navigation::previous_visible(&self.registry, &self.state.values, current.order()) {
            Some(previous) => {
                let to = previous.id().clone();
                let from = mem::replace(&mut self.state.current_step_id, to.clone());
                debug!(%from, %to, "retreated");
                NavigationOutcome::Moved { from, to }
            }
            None => NavigationOutcome::Stayed,
        }
    }

    /// Moves straight to a visible step without validating anything.
    pub fn jump_to(&mut self, step_id: impl Into<StepId>) -> NavigationOutcome {
        let target = step_id.into();
        let Some(step) = self.registry.step(&target) else {
            warn!(step = %target, "jump to unknown step ignored");
            return NavigationOutcome::Rejected(NavigationError::UnknownStep(target));
        };
        if !step.is_visible(&self.state.values) {
            warn!(step = %target, "jump to hidden step ignored");
            return NavigationOutcome::Rejected(NavigationError::HiddenStep(target));
        }
        if target == self.state.current_step_id {
            return NavigationOutcome::Stayed;
        }
        let from = mem::replace(&mut self.state.current_step_id, target.clone());
        debug!(%from, to = %target, "jumped");
        NavigationOutcome::Moved { from, to: target }
    }

    pub fn is_last_visible_step(&self) -> bool {
        self.current_step().map_or(true, |current| {
            navigation::next_visible(&self.registry, &self.state.values, current.order())
                .is_none()
        })
    }

    pub fn progress(&self) -> Vec<StepProgress> {
        self.visible_steps()
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                let status = if step.id() == &self.state.current_step_id {
                    StepStatus::Current
                } else if self.state.is_visited(step.id()) {
                    StepStatus::Completed
                } else {
                    StepStatus::Upcoming
                };
                StepProgress {
                    id: step.id().clone(),
                    title: step.title().to_string(),
                    position: index + 1,
                    status,
                }
            })
            .collect()
    }

    /// Every derived value, computed from the current values.
    pub fn derived(&self) -> BTreeMap<String, Value> {
        self.derived.recompute(&self.state.values)
    }

    pub fn derived_value(&self, key: &str) -> Option<Value> {
        self.derived.value(key, &self.state.values)
    }

    pub fn to_draft(&self, flow: &str) -> Draft {
        Draft {
            flow: flow.to_string(),
            values: self.state.values.clone(),
            current_step_id: self.state.current_step_id.clone(),
            visited_step_ids: self.state.visited_step_ids.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Hands the values to `adapter` once every visible step validates.
    ///
    /// Only one call runs at a time; a second call while the first is pending fails with
    /// [`SubmitError::InFlight`] without reaching the adapter. The form state is never
    /// modified here, so a rejected or timed-out submission can simply be retried.
    pub async fn submit(
        &self,
        adapter: &dyn SubmissionAdapter,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let _guard = InFlightGuard::acquire(&self.submitting).ok_or_else(|| {
            warn!("submission already in progress");
            SubmitError::InFlight
        })?;

        if let Some((step_id, errors)) = self.first_invalid_step() {
            debug!(step = %step_id, "submission blocked by invalid step");
            return Err(SubmitError::Invalid { step_id, errors });
        }

        let values = self.state.values.clone();
        let outcome = match self.submission_timeout {
            Some(limit) => tokio::time::timeout(limit, adapter.submit(values))
                .await
                .map_err(|_| {
                    warn!(timeout = ?limit, "submission timed out");
                    SubmitError::TimedOut(limit)
                })?,
            None => adapter.submit(values).await,
        };

        match &outcome {
            SubmissionOutcome::Accepted { receipt_id } => info!(receipt_id = %receipt_id, "submission accepted"),
            SubmissionOutcome::Rejected { reason } => warn!(reason = %reason, "submission rejected"),
        }
        Ok(outcome)
    }
}
