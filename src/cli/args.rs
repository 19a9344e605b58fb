//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Keeps a headless Factorio server on the latest stable release.
#[derive(Debug, Parser)]
#[command(name = "factorio-updater")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides /etc/factorio-updater.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Installation root containing the server directory
    #[arg(short, long, global = true, env = "FACTORIO_ROOT")]
    pub root: Option<PathBuf>,

    /// Backup directory, relative to the installation root
    #[arg(long, global = true, env = "FACTORIO_BACKUP_SUFFIX")]
    pub backup_suffix: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Config values given on the command line or through the environment.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            install_root: self.root.clone(),
            backup_suffix: self.backup_suffix.clone(),
        }
    }

    /// Whether prompts may be shown.
    pub fn wants_interaction(&self) -> bool {
        match &self.command {
            Some(Commands::Update(args)) => !args.non_interactive,
            _ => true,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Update the server to the latest release (default if no command specified)
    Update(UpdateArgs),

    /// Show installed and latest versions without changing anything
    Check,

    /// Archive the current installation now
    Backup,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `update` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UpdateArgs {
    /// Back up without asking
    #[arg(long, conflicts_with = "no_backup")]
    pub backup: bool,

    /// Skip the backup without asking
    #[arg(long)]
    pub no_backup: bool,

    /// Keep the downloaded archive after installing
    #[arg(long)]
    pub keep_artifact: bool,

    /// Never prompt; answer from FACTORIO_UPDATER_BACKUP or back up
    #[arg(long)]
    pub non_interactive: bool,
}

impl UpdateArgs {
    /// The backup answer fixed on the command line, if any.
    pub fn backup_choice(&self) -> Option<bool> {
        match (self.backup, self.no_backup) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
