//! Non-interactive UI for cron jobs, pipes and CI.

use std::collections::HashMap;

use crate::error::{Result, UpdaterError};

use super::prompts::parse_answer;
use super::{OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts, e.g.
/// `FACTORIO_UPDATER_BACKUP=no` answers the `backup` prompt.
pub const PROMPT_ENV_PREFIX: &str = "FACTORIO_UPDATER_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `FACTORIO_UPDATER_<KEY>` variables, falling
/// back to the prompt's default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_details() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_field(&mut self, key: &str, value: &str) {
        if self.mode.shows_details() {
            println!("  {}: {}", key, value);
        }
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return parse_answer(value).ok_or_else(|| {
                UpdaterError::Other(anyhow::anyhow!(
                    "{}={} is not a yes/no answer",
                    env_key,
                    value
                ))
            });
        }

        prompt.default.ok_or_else(|| {
            UpdaterError::Other(anyhow::anyhow!(
                "Cannot ask '{}' in non-interactive mode (no default answer, set {})",
                prompt.key,
                env_key
            ))
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner {
            show: self.mode.shows_status(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only the final line.
struct NoopSpinner {
    show: bool,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn set_progress(&mut self, _done: u64, _total: Option<u64>) {}

    fn finish_success(&mut self, msg: &str) {
        if self.show {
            println!("✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui_with(pairs: &[(&str, &str)]) -> NonInteractiveUI {
        let overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NonInteractiveUI::with_overrides(OutputMode::Silent, overrides)
    }

    #[test]
    fn is_never_interactive() {
        assert!(!NonInteractiveUI::new(OutputMode::Normal).is_interactive());
    }

    #[test]
    fn confirm_uses_default() {
        let mut ui = ui_with(&[]);
        let prompt = Prompt::confirm("backup", "Back up?").with_default(true);
        assert!(ui.confirm(&prompt).unwrap());
    }

    #[test]
    fn confirm_env_override_wins() {
        let mut ui = ui_with(&[("FACTORIO_UPDATER_BACKUP", "nein")]);
        let prompt = Prompt::confirm("backup", "Back up?").with_default(true);
        assert!(!ui.confirm(&prompt).unwrap());
    }

    #[test]
    fn confirm_rejects_garbage_override() {
        let mut ui = ui_with(&[("FACTORIO_UPDATER_BACKUP", "sometimes")]);
        let prompt = Prompt::confirm("backup", "Back up?").with_default(true);
        let err = ui.confirm(&prompt).unwrap_err();
        assert!(err.to_string().contains("FACTORIO_UPDATER_BACKUP"));
    }

    #[test]
    fn confirm_without_default_fails() {
        let mut ui = ui_with(&[]);
        let prompt = Prompt::confirm("backup", "Back up?");
        assert!(ui.confirm(&prompt).is_err());
    }
}
