use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::flows::FlowKind;
use crate::wizard::{FormValues, SubmissionAdapter, SubmissionOutcome};

pub const SUBMISSIONS_DIR: &str = "submissions";

#[derive(Serialize)]
struct SubmissionRecord<'a> {
    receipt_id: &'a str,
    flow: &'a str,
    submitted_at: DateTime<Utc>,
    values: &'a FormValues,
}

/// Stands in for the publishing backend: files each submission as JSON and hands back a
/// UUID receipt.
#[derive(Debug, Clone)]
pub struct LocalSubmission {
    dir: PathBuf,
    flow: FlowKind,
}

impl LocalSubmission {
    pub fn new(dir: impl Into<PathBuf>, flow: FlowKind) -> Self {
        Self {
            dir: dir.into(),
            flow,
        }
    }

    pub fn record_path(&self, receipt_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", self.flow.slug(), receipt_id))
    }

    fn write_record(&self, record: &SubmissionRecord<'_>) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(record.receipt_id);
        write_new(&path, &serde_json::to_string_pretty(record)?)?;
        Ok(path)
    }
}

#[async_trait]
impl SubmissionAdapter for LocalSubmission {
    async fn submit(&self, values: FormValues) -> SubmissionOutcome {
        let receipt_id = Uuid::new_v4().to_string();
        let record = SubmissionRecord {
            receipt_id: &receipt_id,
            flow: self.flow.slug(),
            submitted_at: Utc::now(),
            values: &values,
        };
        match self.write_record(&record) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "submission recorded");
                SubmissionOutcome::Accepted { receipt_id }
            }
            Err(err) => SubmissionOutcome::Rejected {
                reason: format!("could not record submission: {err}"),
            },
        }
    }
}

fn write_new(path: &Path, data: &str) -> Result<(), StorageError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
