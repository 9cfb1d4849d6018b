use std::collections::VecDeque;
use std::error::Error as _;
use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::wizard::FieldKind;

use super::context::CommandError;
use super::output;
use super::runner::{
    ConfirmationResponse, FormSummary, PromptContext, PromptResponse, StepInteraction,
};

const BACK_LABEL: &str = "<- Back";
const CONFIRM_OPTIONS: [&str; 3] = ["Submit", "Go back and edit", "Cancel (save draft)"];

fn prompt_title(context: &PromptContext<'_>) -> String {
    let marker = if context.field.required { "" } else { " (optional)" };
    format!(
        "[{}/{}] {}{}",
        context.field_index + 1,
        context.field_total,
        context.field.label,
        marker
    )
}

/// Ctrl-C at a prompt cancels the wizard; any other terminal failure is reported.
fn cancel_on_interrupt<T>(err: dialoguer::Error, cancel: T) -> Result<T, CommandError> {
    let interrupted = err
        .source()
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|source| source.kind() == io::ErrorKind::Interrupted);
    if interrupted {
        Ok(cancel)
    } else {
        Err(err.into())
    }
}

/// Terminal prompts backed by dialoguer.
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn prompt_text(&self, context: &PromptContext<'_>) -> Result<PromptResponse, CommandError> {
        if let Some(help) = context.field.help {
            output::hint(help);
        }
        output::hint("Enter keeps the current value. :clear, :back, :help, :cancel.");
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt_title(context))
            .allow_empty(true);
        if let Some(current) = &context.current {
            input = input.with_initial_text(current.clone());
        }
        match input.interact_text() {
            Ok(line) if context.current.as_deref() == Some(line.trim()) => Ok(PromptResponse::Keep),
            Ok(line) => Ok(PromptResponse::from_input(&line)),
            Err(err) => cancel_on_interrupt(err, PromptResponse::Cancel),
        }
    }

    fn prompt_choice(
        &self,
        context: &PromptContext<'_>,
        options: &[String],
    ) -> Result<PromptResponse, CommandError> {
        let mut items: Vec<&str> = options.iter().map(String::as_str).collect();
        items.push(BACK_LABEL);
        let default = context
            .current
            .as_deref()
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);
        match Select::with_theme(&self.theme)
            .with_prompt(prompt_title(context))
            .items(&items)
            .default(default)
            .interact_opt()
        {
            Ok(Some(index)) if index == options.len() => Ok(PromptResponse::Back),
            Ok(Some(index)) => Ok(PromptResponse::Value(options[index].clone())),
            Ok(None) => Ok(PromptResponse::Cancel),
            Err(err) => cancel_on_interrupt(err, PromptResponse::Cancel),
        }
    }

    fn prompt_boolean(&self, context: &PromptContext<'_>) -> Result<PromptResponse, CommandError> {
        let default = context.current.as_deref() == Some("yes");
        match Confirm::with_theme(&self.theme)
            .with_prompt(prompt_title(context))
            .default(default)
            .interact_opt()
        {
            Ok(Some(true)) => Ok(PromptResponse::Value("yes".into())),
            Ok(Some(false)) => Ok(PromptResponse::Value("no".into())),
            Ok(None) => Ok(PromptResponse::Cancel),
            Err(err) => cancel_on_interrupt(err, PromptResponse::Cancel),
        }
    }
}

impl StepInteraction for DialoguerInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, CommandError> {
        match &context.field.kind {
            FieldKind::Choice(options) => self.prompt_choice(context, options),
            FieldKind::Boolean => self.prompt_boolean(context),
            _ => self.prompt_text(context),
        }
    }

    fn confirm(
        &mut self,
        _summary: &FormSummary,
        lines: &[String],
    ) -> Result<ConfirmationResponse, CommandError> {
        for line in lines {
            output::line(line);
        }
        match Select::with_theme(&self.theme)
            .with_prompt("Submit this form?")
            .items(&CONFIRM_OPTIONS)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => Ok(ConfirmationResponse::Confirm),
            Ok(Some(1)) => Ok(ConfirmationResponse::Back),
            Ok(_) => Ok(ConfirmationResponse::Cancel),
            Err(err) => cancel_on_interrupt(err, ConfirmationResponse::Cancel),
        }
    }
}

/// Answers prompts from queued script lines. Running out of lines cancels the wizard.
pub struct ScriptInteraction<'a> {
    lines: &'a mut VecDeque<String>,
}

impl<'a> ScriptInteraction<'a> {
    pub fn new(lines: &'a mut VecDeque<String>) -> Self {
        Self { lines }
    }
}

impl StepInteraction for ScriptInteraction<'_> {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, CommandError> {
        let mut prompt = format!("{}:", prompt_title(context));
        if let FieldKind::Choice(options) = &context.field.kind {
            let listed: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(index, option)| format!("{}) {}", index + 1, option))
                .collect();
            prompt = format!("{} {}", prompt, listed.join("  "));
        }
        if let Some(current) = &context.current {
            prompt = format!("{} [{}]", prompt, current);
        }
        output::line(prompt);
        Ok(match self.lines.pop_front() {
            Some(line) => PromptResponse::from_input(&line),
            None => PromptResponse::Cancel,
        })
    }

    fn confirm(
        &mut self,
        _summary: &FormSummary,
        lines: &[String],
    ) -> Result<ConfirmationResponse, CommandError> {
        for line in lines {
            output::line(line);
        }
        output::line("Submit? (yes / back / cancel)");
        let response = match self.lines.pop_front().map(|line| line.trim().to_ascii_lowercase()) {
            Some(answer) if matches!(answer.as_str(), "y" | "yes" | "submit") => {
                ConfirmationResponse::Confirm
            }
            Some(answer) if matches!(answer.as_str(), "b" | "back" | ":back") => {
                ConfirmationResponse::Back
            }
            _ => ConfirmationResponse::Cancel,
        };
        Ok(response)
    }
}
