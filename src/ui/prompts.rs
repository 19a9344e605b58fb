//! Yes/no prompts.
//!
//! Answers are accepted in English or German: `y`, `yes`, `j`, `ja` mean
//! yes and `n`, `no`, `nein` mean no, in any case. Anything else asks
//! again.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::error::{Result, UpdaterError};
use crate::updater::{BackupDecision, UpdatePlan};

use super::{Prompt, UserInterface};

const YES: &[&str] = &["y", "yes", "j", "ja"];
const NO: &[&str] = &["n", "no", "nein"];

/// Interpret one line of input. `None` means the answer was not understood.
pub fn parse_answer(input: &str) -> Option<bool> {
    let answer = input.trim().to_lowercase();
    if YES.contains(&answer.as_str()) {
        Some(true)
    } else if NO.contains(&answer.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// The question followed by a `[y/n]` hint, capitalised on the default.
pub fn format_question(prompt: &Prompt) -> String {
    let hint = match prompt.default {
        Some(true) => "[Y/n]",
        Some(false) => "[y/N]",
        None => "[y/n]",
    };
    format!("{} {}", prompt.question, hint)
}

/// Read answers until one is understood.
///
/// Empty input takes the prompt's default when it has one. `on_invalid`
/// is called with each rejected answer before asking again.
pub fn ask_until_answered(
    prompt: &Prompt,
    mut read: impl FnMut() -> Result<String>,
    mut on_invalid: impl FnMut(&str),
) -> Result<bool> {
    loop {
        let input = read()?;
        if input.trim().is_empty() {
            if let Some(default) = prompt.default {
                return Ok(default);
            }
        }
        match parse_answer(&input) {
            Some(answer) => return Ok(answer),
            None => on_invalid(input.trim()),
        }
    }
}

fn map_dialoguer_err(e: dialoguer::Error) -> UpdaterError {
    UpdaterError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask `prompt` on `term`, re-asking until the answer is understood.
pub fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<bool> {
    let theme = prompt_theme();
    let question = format_question(prompt);

    ask_until_answered(
        prompt,
        || {
            Input::<String>::with_theme(&theme)
                .with_prompt(&question)
                .allow_empty(true)
                .interact_on(term)
                .map_err(map_dialoguer_err)
        },
        |answer| {
            term.write_line(&format!(
                "Please answer y(es)/j(a) or n(o)/n(ein), not '{}'",
                answer
            ))
            .ok();
        },
    )
}

/// Answers the backup question by asking the operator.
pub struct PromptDecision<'a> {
    ui: &'a mut dyn UserInterface,
}

impl<'a> PromptDecision<'a> {
    pub const KEY: &'static str = "backup";

    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui }
    }

    pub fn prompt() -> Prompt {
        Prompt::confirm(Self::KEY, "Back up the installation before updating?")
            .with_default(true)
    }
}

impl BackupDecision for PromptDecision<'_> {
    fn should_backup(&mut self, plan: &UpdatePlan) -> Result<bool> {
        self.ui.show_field("Installed", &plan.current.to_string());
        self.ui.show_field("Latest", &plan.latest.version.to_string());
        self.ui.confirm(&Self::prompt())
    }
}
