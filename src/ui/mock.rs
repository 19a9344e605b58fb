//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. Prompt answers are queued as raw
//! strings and go through the same parsing as terminal input.
//!
//! # Example
//!
//! ```
//! use factorio_updater::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.queue_answers("backup", &["maybe", "ja"]);
//!
//! let answer = ui.confirm(&Prompt::confirm("backup", "Back up?")).unwrap();
//! assert!(answer);
//! assert_eq!(ui.prompts_shown(), &["backup".to_string(), "backup".to_string()]);
//! ```

use std::collections::{HashMap, VecDeque};

use crate::error::{Result, UpdaterError};

use super::prompts::ask_until_answered;
use super::{OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    fields: Vec<(String, String)>,
    headers: Vec<String>,
    spinners: Vec<String>,
    answers: HashMap<String, VecDeque<String>>,
    prompts_shown: Vec<String>,
    rejected_answers: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Queue raw answers for a prompt key, consumed in order.
    pub fn queue_answers(&mut self, key: &str, answers: &[&str]) {
        self.answers
            .entry(key.to_string())
            .or_default()
            .extend(answers.iter().map(|a| a.to_string()));
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Messages of every spinner started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Keys of every prompt shown, once per attempt.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Answers that were not understood.
    pub fn rejected_answers(&self) -> &[String] {
        &self.rejected_answers
    }

    /// Look up a captured field by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_field(&mut self, key: &str, value: &str) {
        self.fields.push((key.to_string(), value.to_string()));
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        let key = prompt.key.clone();
        let queue = self.answers.entry(key.clone()).or_default();
        let shown = &mut self.prompts_shown;
        let rejected = &mut self.rejected_answers;

        ask_until_answered(
            prompt,
            || {
                shown.push(key.clone());
                queue.pop_front().ok_or_else(|| {
                    UpdaterError::Other(anyhow::anyhow!("no answer queued for prompt '{}'", key))
                })
            },
            |answer| rejected.push(answer.to_string()),
        )
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::default())
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that discards everything.
#[derive(Debug, Default)]
pub struct MockSpinner {
    pub last_progress: Option<(u64, Option<u64>)>,
    pub finished: Option<String>,
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn set_progress(&mut self, done: u64, total: Option<u64>) {
        self.last_progress = Some((done, total));
    }

    fn finish_success(&mut self, msg: &str) {
        self.finished = Some(msg.to_string());
    }

    fn finish_error(&mut self, msg: &str) {
        self.finished = Some(msg.to_string());
    }
}
