//! Shell commands. Each handler receives the shell context and the remaining tokens.

use crate::errors::{StorageError, SubmitError};
use crate::flows::FlowKind;
use crate::utils::build_info;
use crate::wizard::{DraftStore, SubmissionOutcome, Wizard};

use super::context::{CliMode, CommandError, CommandResult, ShellContext};
use super::interaction::{DialoguerInteraction, ScriptInteraction};
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
use super::runner::{RunResult, WizardRunner};
use super::submission::{LocalSubmission, SUBMISSIONS_DIR};

const DRAFT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "help",
        "Show available commands",
        "help [command]",
        cmd_help,
    )
    .with_aliases(&["h"]));
    registry.register(CommandEntry::new(
        "flows",
        "List the available wizards",
        "flows",
        cmd_flows,
    ));
    registry.register(CommandEntry::new(
        "start",
        "Start a wizard from scratch",
        "start <flow>",
        cmd_start,
    ));
    registry.register(CommandEntry::new(
        "resume",
        "Continue a wizard from its saved draft",
        "resume <flow>",
        cmd_resume,
    ));
    registry.register(CommandEntry::new(
        "drafts",
        "List saved drafts",
        "drafts",
        cmd_drafts,
    ));
    registry.register(CommandEntry::new(
        "discard",
        "Delete the saved draft of a wizard",
        "discard <flow>",
        cmd_discard,
    ));
    registry.register(CommandEntry::new(
        "version",
        "Show build information",
        "version",
        cmd_version,
    ));
    registry.register(CommandEntry::new(
        "exit",
        "Exit the shell",
        "exit",
        cmd_exit,
    )
    .with_aliases(&["quit"]));
}

fn require_flow(context: &ShellContext, args: &[&str], usage: &str) -> Result<FlowKind, CommandError> {
    match args {
        [slug] => context.resolve_flow(slug),
        _ => Err(CommandError::InvalidArguments(format!("usage: {}", usage))),
    }
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let Some(entry) = context.command(&name.to_ascii_lowercase()) else {
            context.suggest_command(name);
            return Ok(());
        };
        output::section(format!("Help: {}", entry.name));
        output::info(format!("  Description: {}", entry.description));
        output::info(format!("  Usage: {}", entry.usage));
        if !entry.aliases.is_empty() {
            output::info(format!("  Aliases: {}", entry.aliases.join(", ")));
        }
        return Ok(());
    }

    output::section("Available commands");
    for entry in context.registry.list() {
        output::info(format!("  {:<10} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

fn cmd_flows(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Wizards");
    for kind in FlowKind::ALL {
        let steps = kind.registry()?.len();
        let marker = if context.drafts.load(kind.slug())?.is_some() {
            " (draft saved)"
        } else {
            ""
        };
        output::info(format!(
            "  {:<22} {} - {} steps{}",
            kind.slug(),
            kind.title(),
            steps,
            marker
        ));
    }
    Ok(())
}

fn cmd_start(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = require_flow(context, args, "start <flow>")?;
    if context.drafts.load(kind.slug())?.is_some() {
        output::warning(format!(
            "A draft exists for `{}`; it will be replaced if this run is cancelled.",
            kind
        ));
        output::hint(format!("Use `resume {}` to continue it instead.", kind));
    }
    let wizard = kind.build()?;
    drive(context, kind, wizard)
}

fn cmd_resume(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = require_flow(context, args, "resume <flow>")?;
    let Some(draft) = context.drafts.load(kind.slug())? else {
        return Err(CommandError::InvalidArguments(format!(
            "No draft saved for `{}`. Use `start {}` instead.",
            kind, kind
        )));
    };
    let wizard = kind.resume(draft)?;
    output::info(format!(
        "Resuming `{}` at step `{}`.",
        kind,
        wizard.current_step_id()
    ));
    drive(context, kind, wizard)
}

fn cmd_drafts(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let drafts = context.drafts.list()?;
    if drafts.is_empty() {
        output::info("No drafts saved.");
        return Ok(());
    }
    output::section("Drafts");
    for draft in drafts {
        output::info(format!(
            "  {:<22} step {:<16} saved {}",
            draft.flow,
            draft.current_step_id,
            draft.saved_at.format(DRAFT_TIME_FORMAT)
        ));
    }
    Ok(())
}

fn cmd_discard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = require_flow(context, args, "discard <flow>")?;
    match context.drafts.discard(kind.slug()) {
        Ok(()) => {
            output::success(format!("Draft for `{}` discarded.", kind));
            Ok(())
        }
        Err(StorageError::NotFound(_)) => Err(CommandError::InvalidArguments(format!(
            "No draft saved for `{}`.",
            kind
        ))),
        Err(err) => Err(err.into()),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let build = build_info::current();
    output::info(build.headline());
    for line in build.detail_lines() {
        output::info(format!("  {}", line));
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

/// Runs the wizard until it is submitted or cancelled. Rejected and timed-out
/// submissions go back to the wizard with every answer kept.
fn drive(context: &mut ShellContext, kind: FlowKind, wizard: Wizard) -> CommandResult {
    let mut wizard = wizard.with_submission_timeout(context.settings.submission_timeout());
    let adapter = LocalSubmission::new(context.home.join(SUBMISSIONS_DIR), kind);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    output::section(kind.title());
    loop {
        let result = match context.mode {
            CliMode::Interactive => {
                WizardRunner::new(&mut wizard).run(&mut DialoguerInteraction::new())
            }
            CliMode::Script => {
                let mut interaction = ScriptInteraction::new(&mut context.script_lines);
                WizardRunner::new(&mut wizard).run(&mut interaction)
            }
        };
        match result {
            Ok(RunResult::ReadyToSubmit) => {}
            Ok(RunResult::Cancelled) => return cancel(context, kind, &wizard),
            Err(err) => {
                // Keep the answers before reporting the terminal failure.
                cancel(context, kind, &wizard)?;
                return Err(err);
            }
        }

        match runtime.block_on(wizard.submit(&adapter)) {
            Ok(SubmissionOutcome::Accepted { receipt_id }) => {
                output::success(format!("Submission accepted. Receipt: {}", receipt_id));
                return discard_stale_draft(context, kind);
            }
            Ok(SubmissionOutcome::Rejected { reason }) => {
                output::error(format!("Submission failed: {}", reason));
                output::hint("Your answers were kept. Review them and submit again.");
            }
            Err(SubmitError::Invalid { step_id, errors }) => {
                for (_, message) in errors.iter() {
                    output::warning(message);
                }
                wizard.jump_to(step_id);
            }
            Err(err @ SubmitError::TimedOut(_)) => {
                output::error(err.to_string());
                output::hint("Your answers were kept. Try submitting again.");
            }
            Err(err @ SubmitError::InFlight) => {
                return Err(CommandError::Message(err.to_string()));
            }
        }
    }
}

fn cancel(context: &ShellContext, kind: FlowKind, wizard: &Wizard) -> CommandResult {
    if !context.settings.autosave_drafts {
        output::info("Wizard cancelled.");
        return Ok(());
    }
    context.drafts.save(&wizard.to_draft(kind.slug()))?;
    output::success(format!(
        "Draft saved. Resume with `resume {}`.",
        kind.slug()
    ));
    Ok(())
}

fn discard_stale_draft(context: &ShellContext, kind: FlowKind) -> CommandResult {
    match context.drafts.discard(kind.slug()) {
        Ok(()) | Err(StorageError::NotFound(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
