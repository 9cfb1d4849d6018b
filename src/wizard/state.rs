use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::step::StepId;
use super::values::FormValues;

/// Everything a single wizard instance mutates over its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub values: FormValues,
    pub current_step_id: StepId,
    /// Steps that passed validation at least once.
    #[serde(default)]
    pub visited_step_ids: BTreeSet<StepId>,
}

impl FormState {
    pub fn new(values: FormValues, current_step_id: StepId) -> Self {
        Self {
            values,
            current_step_id,
            visited_step_ids: BTreeSet::new(),
        }
    }

    pub fn is_visited(&self, id: &StepId) -> bool {
        self.visited_step_ids.contains(id)
    }
}

/// Indicator state for one entry in a step bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub id: StepId,
    pub title: String,
    /// 1-based position among the visible steps.
    pub position: usize,
    pub status: StepStatus,
}
