//! The `backup` command.

use indicatif::HumanBytes;

use crate::backup::BackupManager;
use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Archives the current installation without updating it.
pub struct BackupCommand {
    config: UpdaterConfig,
}

impl BackupCommand {
    pub fn new(config: UpdaterConfig) -> Self {
        Self { config }
    }
}

impl Command for BackupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let manager = BackupManager::new(self.config.backup_dir());
        let source = self.config.product_dir();

        let mut spinner = ui.start_spinner(&format!("Backing up {}...", source.display()));
        let record = match manager.backup(&source) {
            Ok(record) => record,
            Err(e) => {
                spinner.finish_error("Backup failed");
                return Err(e);
            }
        };
        spinner.finish_success("Backup complete");

        ui.show_field("Archive", &record.archive.display().to_string());
        ui.show_field("Size", &HumanBytes(record.size).to_string());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_archive_into_backup_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("factorio/saves")).unwrap();
        fs::write(temp.path().join("factorio/saves/world.zip"), b"world").unwrap();
        let mut ui = MockUI::new();

        let result = BackupCommand::new(UpdaterConfig::for_root(temp.path()))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let archive = ui.field("Archive").unwrap();
        assert!(archive.starts_with(&temp.path().join("Backups").display().to_string()));
        assert!(archive.ends_with(".tar.xz"));
    }

    #[test]
    fn missing_installation_fails() {
        let temp = TempDir::new().unwrap();
        let err = BackupCommand::new(UpdaterConfig::for_root(temp.path()))
            .execute(&mut MockUI::new())
            .unwrap_err();
        assert_eq!(err.kind(), "BackupError");
        assert!(!temp.path().join("Backups").exists());
    }
}
