//! Drafts: the `{values, current_step_id}` snapshot of an unfinished wizard.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::StorageError;

use super::step::StepId;
use super::values::FormValues;

const DRAFT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Slug of the flow the draft belongs to.
    pub flow: String,
    pub values: FormValues,
    pub current_step_id: StepId,
    #[serde(default)]
    pub visited_step_ids: BTreeSet<StepId>,
    pub saved_at: DateTime<Utc>,
}

pub trait DraftStore: Send + Sync {
    fn save(&self, draft: &Draft) -> Result<(), StorageError>;

    fn load(&self, flow: &str) -> Result<Option<Draft>, StorageError>;

    fn discard(&self, flow: &str) -> Result<(), StorageError>;

    /// Every stored draft, newest first.
    fn list(&self) -> Result<Vec<Draft>, StorageError>;
}

/// One pretty-printed JSON file per flow under `dir`.
#[derive(Debug, Clone)]
pub struct JsonDraftStore {
    dir: PathBuf,
}

impl JsonDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn draft_path(&self, flow: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", canonical_name(flow), DRAFT_EXTENSION))
    }
}

impl DraftStore for JsonDraftStore {
    fn save(&self, draft: &Draft) -> Result<(), StorageError> {
        let path = self.draft_path(&draft.flow);
        let data = serde_json::to_string_pretty(draft)?;
        write_atomic(&path, &data)?;
        info!(flow = %draft.flow, path = %path.display(), "draft saved");
        Ok(())
    }

    fn load(&self, flow: &str) -> Result<Option<Draft>, StorageError> {
        let path = self.draft_path(flow);
        if !path.exists() {
            return Ok(None);
        }
        let draft = read_draft(&path)?;
        debug!(flow, path = %path.display(), "draft loaded");
        Ok(Some(draft))
    }

    fn discard(&self, flow: &str) -> Result<(), StorageError> {
        let path = self.draft_path(flow);
        if !path.exists() {
            return Err(StorageError::NotFound(format!("no draft for `{flow}`")));
        }
        fs::remove_file(&path)?;
        debug!(flow, "draft discarded");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Draft>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut drafts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DRAFT_EXTENSION) {
                continue;
            }
            match read_draft(&path) {
                Ok(draft) => drafts.push(draft),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable draft"),
            }
        }
        drafts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(drafts)
    }
}

fn read_draft(path: &Path) -> Result<Draft, StorageError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "draft".into()
    } else {
        sanitized
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(TMP_SUFFIX);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
