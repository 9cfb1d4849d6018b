//! Drives a [`Wizard`] field by field through a [`StepInteraction`].
//!
//! The runner owns no state of its own: every answer is written straight into the wizard,
//! so cancelling at any point leaves a wizard that can be saved as a draft.

use serde_json::Value;

use crate::wizard::validation::check_field;
use crate::wizard::{
    display_value, FieldDescriptor, FieldErrors, NavigationOutcome, StepDefinition, Wizard,
};

use super::context::CommandError;
use super::output;

const UNFILLED: &str = "[unfilled]";

/// How a single prompt was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Raw text to parse for the field's kind.
    Value(String),
    /// Keep whatever the field holds now.
    Keep,
    /// Remove the current value.
    Clear,
    /// Previous field, or previous step from the first field.
    Back,
    Help,
    Cancel,
}

impl PromptResponse {
    /// Parses a typed line, recognising the `:keep`, `:clear`, `:back`, `:help` and
    /// `:cancel` commands. An empty line keeps the current value.
    pub fn from_input(input: &str) -> Self {
        match input.trim() {
            "" | ":keep" => PromptResponse::Keep,
            ":clear" => PromptResponse::Clear,
            ":back" => PromptResponse::Back,
            ":help" => PromptResponse::Help,
            ":cancel" => PromptResponse::Cancel,
            other => PromptResponse::Value(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

/// Data needed to render one field prompt.
pub struct PromptContext<'a> {
    pub field: &'a FieldDescriptor,
    pub step_title: &'a str,
    /// 1-based position of the step among the visible steps.
    pub step_position: usize,
    pub step_total: usize,
    pub field_index: usize,
    pub field_total: usize,
    /// Current value as displayed, if any.
    pub current: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarySection {
    pub title: String,
    pub entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSummary {
    pub sections: Vec<SummarySection>,
    pub derived: Vec<(String, String)>,
}

pub trait StepInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, CommandError>;

    fn confirm(
        &mut self,
        summary: &FormSummary,
        lines: &[String],
    ) -> Result<ConfirmationResponse, CommandError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// Every visible step validated and the summary was confirmed.
    ReadyToSubmit,
    Cancelled,
}

enum StepControl {
    Done,
    Back,
    Cancel,
    /// A write hid the active step and the wizard moved elsewhere.
    Renavigated,
}

pub struct WizardRunner<'a> {
    wizard: &'a mut Wizard,
}

impl<'a> WizardRunner<'a> {
    pub fn new(wizard: &'a mut Wizard) -> Self {
        Self { wizard }
    }

    pub fn run<I: StepInteraction>(
        &mut self,
        interaction: &mut I,
    ) -> Result<RunResult, CommandError> {
        loop {
            let Some(step) = self.wizard.current_step().cloned() else {
                return Ok(RunResult::Cancelled);
            };
            let (position, total) = self.position_of(&step);
            output::section(format!("Step {} of {}: {}", position, total, step.title()));

            match self.collect_step(&step, position, total, interaction)? {
                StepControl::Cancel => return Ok(RunResult::Cancelled),
                StepControl::Renavigated => continue,
                StepControl::Back => {
                    if !self.wizard.retreat().moved() {
                        output::warning("Already at the first step.");
                    }
                    continue;
                }
                StepControl::Done => {}
            }

            match self.wizard.advance() {
                NavigationOutcome::Invalid(errors) => report_errors(&errors),
                NavigationOutcome::ReadyToSubmit => {
                    let summary = build_summary(self.wizard);
                    let lines = format_summary_lines(&summary);
                    match interaction.confirm(&summary, &lines)? {
                        ConfirmationResponse::Confirm => return Ok(RunResult::ReadyToSubmit),
                        ConfirmationResponse::Back => continue,
                        ConfirmationResponse::Cancel => return Ok(RunResult::Cancelled),
                    }
                }
                NavigationOutcome::Moved { .. }
                | NavigationOutcome::Stayed
                | NavigationOutcome::Rejected(_) => {}
            }
        }
    }

    fn position_of(&self, step: &StepDefinition) -> (usize, usize) {
        let visible = self.wizard.visible_steps();
        let position = visible
            .iter()
            .position(|candidate| candidate.id() == step.id())
            .map_or(1, |index| index + 1);
        (position, visible.len())
    }

    fn collect_step<I: StepInteraction>(
        &mut self,
        step: &StepDefinition,
        position: usize,
        total: usize,
        interaction: &mut I,
    ) -> Result<StepControl, CommandError> {
        let fields = step.fields();
        let mut index = 0;

        while index < fields.len() {
            let field = &fields[index];
            let context = PromptContext {
                field,
                step_title: step.title(),
                step_position: position,
                step_total: total,
                field_index: index,
                field_total: fields.len(),
                current: self
                    .wizard
                    .get(field.key)
                    .map(display_value)
                    .filter(|value| !value.is_empty()),
            };

            match interaction.prompt_field(&context)? {
                PromptResponse::Cancel => return Ok(StepControl::Cancel),
                PromptResponse::Back => {
                    if index == 0 {
                        return Ok(StepControl::Back);
                    }
                    index -= 1;
                }
                PromptResponse::Help => {
                    output::info(
                        field
                            .help
                            .unwrap_or("No additional information available for this field."),
                    );
                }
                PromptResponse::Keep => {
                    if self.accept(field) {
                        index += 1;
                    }
                }
                PromptResponse::Clear => {
                    self.wizard.remove(field.key);
                    if !field.required {
                        index += 1;
                    }
                }
                PromptResponse::Value(raw) => match field.kind.parse_input(&raw) {
                    Err(message) => output::warning(message),
                    Ok(Value::Null) => {
                        self.wizard.remove(field.key);
                        if self.accept(field) {
                            index += 1;
                        }
                    }
                    Ok(value) => {
                        self.wizard.set(field.key, value)?;
                        if self.accept(field) {
                            index += 1;
                        }
                    }
                },
            }

            if self.wizard.current_step_id() != step.id() {
                return Ok(StepControl::Renavigated);
            }
        }
        Ok(StepControl::Done)
    }

    /// Checks the field as it stands; warns and returns false when it needs another answer.
    fn accept(&self, field: &FieldDescriptor) -> bool {
        match check_field(field, self.wizard.values()) {
            Some(message) => {
                output::warning(message);
                false
            }
            None => true,
        }
    }
}

fn report_errors(errors: &FieldErrors) {
    for (_, message) in errors.iter() {
        output::warning(message);
    }
}

/// Collected values of every visible step plus the derived values.
pub fn build_summary(wizard: &Wizard) -> FormSummary {
    let sections = wizard
        .visible_steps()
        .into_iter()
        .filter(|step| !step.fields().is_empty())
        .map(|step| SummarySection {
            title: step.title().to_string(),
            entries: step
                .fields()
                .iter()
                .map(|field| {
                    let value = wizard
                        .get(field.key)
                        .map(display_value)
                        .filter(|value| !value.is_empty())
                        .unwrap_or_else(|| UNFILLED.to_string());
                    (field.label.to_string(), value)
                })
                .collect(),
        })
        .collect();
    let derived = wizard
        .derived()
        .into_iter()
        .map(|(key, value)| (key, display_value(&value)))
        .collect();
    FormSummary { sections, derived }
}

pub fn format_summary_lines(summary: &FormSummary) -> Vec<String> {
    let mut lines = vec!["Review your entries:".to_string()];
    for section in &summary.sections {
        lines.push(format!("  {}", section.title));
        for (label, value) in &section.entries {
            lines.push(format!("    {}: {}", label, value));
        }
    }
    if !summary.derived.is_empty() {
        lines.push("  Calculated".into());
        for (key, value) in &summary.derived {
            lines.push(format!("    {}: {}", key, value));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{DerivedFn, FieldKind, FieldRule, StepRegistry};
    use std::collections::VecDeque;
    use std::io;

    struct MockInteraction {
        prompts: VecDeque<PromptResponse>,
        confirmations: VecDeque<ConfirmationResponse>,
        seen: Vec<&'static str>,
    }

    impl MockInteraction {
        fn new(prompts: Vec<PromptResponse>, confirmations: Vec<ConfirmationResponse>) -> Self {
            Self {
                prompts: prompts.into(),
                confirmations: confirmations.into(),
                seen: Vec::new(),
            }
        }
    }

    impl StepInteraction for MockInteraction {
        fn prompt_field(
            &mut self,
            context: &PromptContext<'_>,
        ) -> Result<PromptResponse, CommandError> {
            self.seen.push(context.field.key);
            Ok(self.prompts.pop_front().unwrap_or(PromptResponse::Cancel))
        }

        fn confirm(
            &mut self,
            _summary: &FormSummary,
            _lines: &[String],
        ) -> Result<ConfirmationResponse, CommandError> {
            Ok(self
                .confirmations
                .pop_front()
                .unwrap_or(ConfirmationResponse::Cancel))
        }
    }

    /// Answers the first prompt, then loses the terminal.
    struct ClosedTerminal {
        answered: bool,
    }

    impl StepInteraction for ClosedTerminal {
        fn prompt_field(
            &mut self,
            _context: &PromptContext<'_>,
        ) -> Result<PromptResponse, CommandError> {
            if std::mem::replace(&mut self.answered, true) {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "terminal closed").into())
            } else {
                Ok(PromptResponse::Value("Acme".into()))
            }
        }

        fn confirm(
            &mut self,
            _summary: &FormSummary,
            _lines: &[String],
        ) -> Result<ConfirmationResponse, CommandError> {
            Ok(ConfirmationResponse::Cancel)
        }
    }

    fn value(raw: &str) -> PromptResponse {
        PromptResponse::Value(raw.into())
    }

    fn wizard() -> Wizard {
        let registry = StepRegistry::register(vec![
            StepDefinition::new("info", "Info", 1).with_fields([
                FieldDescriptor::new("name", "Name", FieldKind::Text),
                FieldDescriptor::new("isPremium", "Premium", FieldKind::Boolean),
            ]),
            StepDefinition::new("payment", "Payment", 2)
                .visible_when_flag("isPremium")
                .with_field(
                    FieldDescriptor::new("card", "Card number", FieldKind::Text)
                        .with_rule(FieldRule::exact_digits(16)),
                ),
            StepDefinition::new("review", "Review", 3).with_field(
                FieldDescriptor::new("terms", "Terms", FieldKind::Boolean)
                    .with_rule(FieldRule::Accepted),
            ),
        ])
        .unwrap();
        Wizard::new(registry).unwrap()
    }

    #[test]
    fn prompt_commands_are_recognised() {
        assert_eq!(PromptResponse::from_input("  "), PromptResponse::Keep);
        assert_eq!(PromptResponse::from_input(":keep"), PromptResponse::Keep);
        assert_eq!(PromptResponse::from_input(":back"), PromptResponse::Back);
        assert_eq!(PromptResponse::from_input(" Acme "), value("Acme"));
    }

    #[test]
    fn runs_to_submission_skipping_hidden_steps() {
        let mut wizard = wizard();
        let mut interaction = MockInteraction::new(
            vec![value("Acme"), value("no"), value("yes")],
            vec![ConfirmationResponse::Confirm],
        );
        let result = WizardRunner::new(&mut wizard).run(&mut interaction).unwrap();
        assert_eq!(result, RunResult::ReadyToSubmit);
        assert_eq!(interaction.seen, vec!["name", "isPremium", "terms"]);
        assert!(wizard.can_submit());
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let mut wizard = wizard();
        let mut interaction = MockInteraction::new(
            vec![
                PromptResponse::Keep,
                value("Acme"),
                value("maybe"),
                value("yes"),
                value("4111"),
                value("4111 1111 1111 1111"),
            ],
            vec![],
        );
        let result = WizardRunner::new(&mut wizard).run(&mut interaction).unwrap();
        assert_eq!(result, RunResult::Cancelled);
        assert_eq!(
            interaction.seen,
            vec!["name", "name", "isPremium", "isPremium", "card", "card", "terms"]
        );
        assert_eq!(wizard.current_step_id().as_str(), "review");
    }

    #[test]
    fn terminal_failures_are_not_treated_as_cancel() {
        let mut wizard = wizard();
        let mut interaction = ClosedTerminal { answered: false };
        let result = WizardRunner::new(&mut wizard).run(&mut interaction);
        assert!(matches!(
            result,
            Err(CommandError::Io(ref err)) if err.kind() == io::ErrorKind::UnexpectedEof
        ));
        assert_eq!(wizard.get("name").and_then(|v| v.as_str()), Some("Acme"));
        assert_eq!(wizard.current_step_id().as_str(), "info");
    }

    #[test]
    fn back_from_first_field_returns_to_previous_step() {
        let mut wizard = wizard();
        let mut interaction = MockInteraction::new(
            vec![value("Acme"), value("no"), PromptResponse::Back, PromptResponse::Help],
            vec![],
        );
        WizardRunner::new(&mut wizard).run(&mut interaction).unwrap();
        assert_eq!(interaction.seen, vec!["name", "isPremium", "terms", "name", "name"]);
        assert_eq!(wizard.current_step_id().as_str(), "info");
    }

    #[test]
    fn summary_lists_visible_steps_and_derived_values() {
        let mut wizard = wizard().with_derived(DerivedFn::new("name_length", |values| {
            Value::from(values.get_str("name").map_or(0, str::len))
        }));
        wizard.set("name", "Acme").unwrap();
        wizard.set("isPremium", false).unwrap();

        let lines = format_summary_lines(&build_summary(&wizard));
        insta::assert_snapshot!(lines.join("\n"), @r###"
        Review your entries:
          Info
            Name: Acme
            Premium: no
          Review
            Terms: [unfilled]
          Calculated
            name_length: 4
        "###);
    }
}
