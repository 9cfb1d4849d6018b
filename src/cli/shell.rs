//! Line-oriented front-end: a rustyline prompt for people, or stdin lines in script mode.

use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::errors::CliError;
use crate::flows::FlowKind;

use super::context::{CliMode, CommandError, LoopControl, ShellContext};
use super::output;

pub const SCRIPT_ENV: &str = "WIZARD_CORE_CLI_SCRIPT";

/// Commands whose single argument is a flow slug.
const FLOW_COMMANDS: [&str; 3] = ["start", "resume", "discard"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                match handle_line(context, line) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Reads all of stdin up front. Commands and wizard answers share the same queue.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        context.script_lines.push_back(line?);
    }
    while context.running {
        let Some(line) = context.script_lines.pop_front() else {
            break;
        };
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {}", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completes command names, and flow slugs after `start`, `resume` and `discard`.
struct ShellHelper {
    commands: Vec<&'static str>,
}

impl ShellHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    /// Start offset of the word under the cursor and the words that can replace it.
    fn candidates(&self, line: &str) -> (usize, Vec<&'static str>) {
        let start = line.rfind(char::is_whitespace).map_or(0, |idx| idx + 1);
        let needle = line[start..].to_ascii_lowercase();
        let before: Vec<&str> = line[..start].split_whitespace().collect();

        let pool: Vec<&'static str> = match before.as_slice() {
            [] => self.commands.clone(),
            [command] if FLOW_COMMANDS.contains(&command.to_ascii_lowercase().as_str()) => {
                FlowKind::ALL.iter().map(|kind| kind.slug()).collect()
            }
            _ => Vec::new(),
        };
        let matches = pool
            .into_iter()
            .filter(|word| word.starts_with(&needle))
            .collect();
        (start, matches)
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> ShellHelper {
        ShellHelper::new(vec!["start", "drafts", "discard", "resume", "drafts"])
    }

    #[test]
    fn command_names_complete_first() {
        let helper = helper();
        assert_eq!(helper.commands, vec!["discard", "drafts", "resume", "start"]);
        assert_eq!(helper.candidates("d"), (0, vec!["discard", "drafts"]));
        assert_eq!(helper.candidates("  RE"), (2, vec!["resume"]));
    }

    #[test]
    fn flow_slugs_complete_after_flow_commands() {
        let helper = helper();
        assert_eq!(helper.candidates("start le"), (6, vec!["legal-notice"]));
        assert_eq!(helper.candidates("Resume "), (7, FlowKind::ALL.map(FlowKind::slug).to_vec()));
        assert_eq!(helper.candidates("drafts le"), (7, Vec::new()));
        assert_eq!(helper.candidates("start legal-notice x"), (19, Vec::new()));
    }
}
