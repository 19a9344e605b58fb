//! The `check` command.

use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::updater::UpdateOrchestrator;

use super::dispatcher::{Command, CommandResult};

/// Reports installed and latest versions. Never changes the installation.
pub struct CheckCommand {
    config: UpdaterConfig,
}

impl CheckCommand {
    pub fn new(config: UpdaterConfig) -> Self {
        Self { config }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut updater = UpdateOrchestrator::new(self.config.clone())?;

        let mut spinner = ui.start_spinner("Checking for updates...");
        let plan = match updater.check() {
            Ok(plan) => plan,
            Err(e) => {
                spinner.finish_error("Check failed");
                return Err(e);
            }
        };
        spinner.finish_success("Checked");

        ui.show_field("Installed", &plan.current.to_string());
        ui.show_field("Latest", &plan.latest.version.to_string());
        if plan.update_needed() {
            ui.message(&format!(
                "Update available: {} -> {}",
                plan.current, plan.latest.version
            ));
        } else {
            ui.success("Up to date");
        }

        Ok(CommandResult::success())
    }
}
