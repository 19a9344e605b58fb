//! The `update` command.

use std::fs;
use std::path::Path;

use crate::cli::args::UpdateArgs;
use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::release::ProgressCallback;
use crate::ui::{OutputMode, ProgressSpinner, PromptDecision, SpinnerHandle, UserInterface};
use crate::updater::{Stage, UpdateOrchestrator, UpdateOutcome};

use super::dispatcher::{Command, CommandResult};

/// Runs a full update and reports the outcome.
pub struct UpdateCommand {
    config: UpdaterConfig,
    args: UpdateArgs,
}

impl UpdateCommand {
    pub fn new(config: UpdaterConfig, args: UpdateArgs) -> Self {
        Self { config, args }
    }

    fn run(&self, updater: &mut UpdateOrchestrator, ui: &mut dyn UserInterface) -> UpdateOutcome {
        let show_bar = ui.is_interactive() && ui.output_mode().shows_spinners();
        let mut bar: Option<ProgressSpinner> = None;
        let mut on_progress = |done: u64, total: Option<u64>| {
            if show_bar {
                bar.get_or_insert_with(|| ProgressSpinner::download("Downloading"))
                    .set_progress(done, total);
            }
        };

        let outcome = {
            let progress: ProgressCallback<'_> = &mut on_progress;
            match self.args.backup_choice() {
                Some(mut choice) => updater.run_with_progress(&mut choice, Some(progress)),
                None => {
                    let mut decision = PromptDecision::new(ui);
                    updater.run_with_progress(&mut decision, Some(progress))
                }
            }
        };

        if let Some(mut bar) = bar.take() {
            match &outcome {
                UpdateOutcome::Failed {
                    stage: Stage::Download,
                    ..
                } => bar.finish_error("Download failed"),
                _ => bar.finish_success("Downloaded"),
            }
        }
        outcome
    }

    /// Delete the artifact unless it is to be kept.
    fn discard_artifact(&self, path: &Path, ui: &mut dyn UserInterface) {
        if self.args.keep_artifact {
            ui.show_field("Artifact", &path.display().to_string());
            return;
        }
        match fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed artifact {}", path.display()),
            Err(e) => ui.warning(&format!("Could not remove {}: {}", path.display(), e)),
        }
    }
}

impl Command for UpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!(
            "Updating {} in {}",
            self.config.product,
            self.config.install_root.display()
        ));

        if ui.output_mode() == OutputMode::Verbose {
            ui.show_field("Binary", &self.config.binary_path().display().to_string());
            ui.show_field("Backups", &self.config.backup_dir().display().to_string());
            ui.show_field("Downloads", &self.config.download_dir().display().to_string());
        }

        let mut updater = UpdateOrchestrator::new(self.config.clone())?;
        let outcome = self.run(&mut updater, ui);
        let product = &self.config.product;

        match &outcome {
            UpdateOutcome::UpToDate { version, .. } => {
                ui.success(&format!("{}: {} {}", outcome, product, version));
                Ok(CommandResult::success())
            }
            UpdateOutcome::Installed {
                previous,
                version,
                backup,
                artifact,
            } => {
                if let Some(record) = backup {
                    ui.show_field("Backup", &record.archive.display().to_string());
                }
                self.discard_artifact(&artifact.path, ui);
                ui.success(&format!(
                    "{}: {} {} (was {})",
                    outcome, product, version, previous
                ));
                Ok(CommandResult::success())
            }
            UpdateOutcome::Failed { error, .. } => {
                ui.error(&outcome.to_string());
                Ok(CommandResult::from_error(error))
            }
        }
    }
}
