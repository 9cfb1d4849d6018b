use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

pub const HOME_ENV: &str = "WIZARD_CORE_HOME";
const APP_DIR: &str = "wizard_core";
const TMP_SUFFIX: &str = "tmp";

/// User preferences for the terminal front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSettings {
    /// Custom draft directory. Defaults to `<home>/drafts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_dir: Option<PathBuf>,
    #[serde(default = "WizardSettings::default_autosave")]
    pub autosave_drafts: bool,
    #[serde(default = "WizardSettings::default_submission_timeout")]
    pub submission_timeout_secs: Option<u64>,
    #[serde(default = "WizardSettings::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            draft_dir: None,
            autosave_drafts: Self::default_autosave(),
            submission_timeout_secs: Self::default_submission_timeout(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            log_filter: None,
        }
    }
}

impl WizardSettings {
    pub fn default_autosave() -> bool {
        true
    }

    pub fn default_submission_timeout() -> Option<u64> {
        Some(30)
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn submission_timeout(&self) -> Option<Duration> {
        self.submission_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolve_draft_dir(&self, base: &Path) -> PathBuf {
        self.draft_dir
            .clone()
            .unwrap_or_else(|| base.join("drafts"))
    }
}

/// `$WIZARD_CORE_HOME`, else the platform config directory.
pub fn resolve_home() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(custom);
    }
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Loads and stores [`WizardSettings`] as JSON under `<base>/config/settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    base: PathBuf,
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, StorageError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        let settings_path = config_dir.join("settings.json");
        Ok(Self {
            base,
            settings_path,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load(&self) -> Result<WizardSettings, StorageError> {
        if !self.settings_path.exists() {
            return Ok(WizardSettings::default());
        }
        let data = fs::read_to_string(&self.settings_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, settings: &WizardSettings) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = tmp_path(&self.settings_path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.settings_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
