//! Progress spinners and the download bar.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::{should_use_colors, UpdaterTheme};
use super::SpinnerHandle;

const DOWNLOAD_TEMPLATE: &str =
    "{spinner:.magenta} {msg} [{bar:30.magenta/dim}] {bytes}/{total_bytes} ({bytes_per_sec})";

/// A progress spinner or byte-counting bar for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: UpdaterTheme,
}

fn default_theme() -> UpdaterTheme {
    if should_use_colors() {
        UpdaterTheme::new()
    } else {
        UpdaterTheme::plain()
    }
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.magenta} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            theme: default_theme(),
        }
    }

    /// Create a download bar. The length is filled in once the server
    /// reports one.
    pub fn download(message: &str) -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(DOWNLOAD_TEMPLATE)
                .unwrap()
                .progress_chars("=> "),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            bar,
            theme: default_theme(),
        }
    }

    /// Create a spinner that doesn't show (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: default_theme(),
        }
    }

    /// Use `theme` for the final status line.
    pub fn with_theme(mut self, theme: UpdaterTheme) -> Self {
        self.theme = theme;
        self
    }

    fn finish_with(&mut self, line: String) {
        self.bar
            .set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn set_progress(&mut self, done: u64, total: Option<u64>) {
        if let Some(total) = total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        self.bar.set_position(done);
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }
}
