//! Boundary to whatever actually stores a finished form (HTTP API, database, file).
//!
//! The engine only promises two things: it never calls the adapter while a visible step
//! is invalid, and it never runs two adapter calls at once for the same wizard.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::values::FormValues;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted { receipt_id: String },
    Rejected { reason: String },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }
}

#[async_trait]
pub trait SubmissionAdapter: Send + Sync {
    async fn submit(&self, values: FormValues) -> SubmissionOutcome;
}

/// Adapts an async closure into a [`SubmissionAdapter`].
pub struct SubmitFn<F>(pub F);

#[async_trait]
impl<F, Fut> SubmissionAdapter for SubmitFn<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = SubmissionOutcome> + Send,
{
    async fn submit(&self, values: FormValues) -> SubmissionOutcome {
        (self.0)(values).await
    }
}

/// Holds the in-flight flag for as long as it lives. Dropping it, including when the
/// submitting future is dropped mid-flight, clears the flag.
pub(crate) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = SubmissionOutcome::Accepted {
            receipt_id: "r-1".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["receipt_id"], "r-1");
    }
}
