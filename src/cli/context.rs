//! Shell state, dispatch and error reporting shared by every command.

use std::{collections::VecDeque, io, path::PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;

use crate::config::{resolve_home, SettingsManager, WizardSettings};
use crate::errors::{CliError, ConfigurationError, StorageError, WizardError};
use crate::flows::FlowKind;
use crate::wizard::JsonDraftStore;

use super::commands;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};

const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub home: PathBuf,
    pub settings: WizardSettings,
    pub drafts: JsonDraftStore,
    /// Unread stdin lines in script mode; wizard prompts consume from the same queue.
    pub script_lines: VecDeque<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, resolve_home())
    }

    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let settings = SettingsManager::with_base_dir(home.clone())?.load()?;
        crate::init_with_filter(settings.log_filter.as_deref());
        output::set_preferences(OutputPreferences {
            color_enabled: settings.ui_color_enabled,
        });
        let drafts = JsonDraftStore::new(settings.resolve_draft_dir(&home))?;

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            home,
            settings,
            drafts,
            script_lines: VecDeque::new(),
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        "wizard> ".to_string()
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.resolve(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest(input, self.registry.names()) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    /// Resolves a flow slug, printing a suggestion when it is unknown.
    pub(crate) fn resolve_flow(&self, slug: &str) -> Result<FlowKind, CommandError> {
        if let Some(kind) = FlowKind::from_slug(slug) {
            return Ok(kind);
        }
        let mut message = format!("Unknown flow `{}`.", slug);
        if let Some(best) = closest(slug, FlowKind::ALL.iter().map(|kind| kind.slug())) {
            message.push_str(&format!(" Did you mean `{}`?", best));
        }
        Err(CommandError::InvalidArguments(message))
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }
}

fn closest<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let needle = input.to_ascii_lowercase();
    candidates
        .map(|candidate| (levenshtein(candidate, &needle), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
