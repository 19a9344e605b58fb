//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands, UpdateArgs};
use crate::config::{load_config, ConfigOverrides, UpdaterConfig};
use crate::error::{Result, UpdaterError};
use crate::ui::UserInterface;

use super::backup::BackupCommand;
use super::check::CheckCommand;
use super::completions::CompletionsCommand;
use super::update::UpdateCommand;

/// Exit code for a run that failed.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a missing or invalid configuration.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// The failure result for `error`.
    pub fn from_error(error: &UpdaterError) -> Self {
        if error.is_config_error() {
            Self::failure(EXIT_CONFIG_ERROR)
        } else {
            Self::failure(EXIT_FAILURE)
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl CommandDispatcher {
    pub fn new(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            config_path,
            overrides,
        }
    }

    /// Load the layered configuration.
    pub fn load_config(&self) -> Result<UpdaterConfig> {
        load_config(self.config_path.as_deref(), &self.overrides)
    }

    /// Dispatch and execute a command.
    ///
    /// Configuration is only loaded for commands that touch the installation.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let command: Box<dyn Command> = match &cli.command {
            Some(Commands::Completions(args)) => Box::new(CompletionsCommand::new(args.clone())),
            Some(Commands::Check) => Box::new(CheckCommand::new(self.load_config()?)),
            Some(Commands::Backup) => Box::new(BackupCommand::new(self.load_config()?)),
            Some(Commands::Update(args)) => {
                Box::new(UpdateCommand::new(self.load_config()?, args.clone()))
            }
            None => Box::new(UpdateCommand::new(
                self.load_config()?,
                UpdateArgs::default(),
            )),
        };
        command.execute(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn config_errors_map_to_exit_code_two() {
        let err = UpdaterError::ConfigNotFound {
            path: PathBuf::from("/nope.yml"),
        };
        assert_eq!(CommandResult::from_error(&err).exit_code, EXIT_CONFIG_ERROR);

        let err = UpdaterError::ReleaseMetadata {
            message: "HTTP 500".into(),
        };
        assert_eq!(CommandResult::from_error(&err).exit_code, EXIT_FAILURE);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yml");
        let dispatcher = CommandDispatcher::new(Some(missing), ConfigOverrides::default());
        let cli = Cli::try_parse_from(["factorio-updater", "check"]).unwrap();

        let err = dispatcher.dispatch(&cli, &mut MockUI::new()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn completions_need_no_config() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yml");
        let dispatcher = CommandDispatcher::new(Some(missing), ConfigOverrides::default());
        let cli = Cli::try_parse_from(["factorio-updater", "completions", "bash"]).unwrap();

        let result = dispatcher.dispatch(&cli, &mut MockUI::new()).unwrap();
        assert!(result.success);
    }
}
