//! factorio-updater - keeps a headless Factorio server on the latest
//! stable release.
//!
//! An update run probes the installed server binary for its version,
//! asks the release API for the latest stable headless build, optionally
//! archives the current installation, downloads the new release and swaps
//! it into place. The live tree is only ever replaced by a fully extracted
//! one.
//!
//! # Modules
//!
//! - [`backup`] - Compressed archives of the installation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and defaults
//! - [`error`] - Error types and result aliases
//! - [`install`] - Extraction and the staged swap
//! - [`probe`] - Installed version detection
//! - [`release`] - Release metadata and artifact download
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`updater`] - The update state machine
//! - [`version`] - Release version numbers
//!
//! # Example
//!
//! ```
//! use factorio_updater::version::{InstalledVersion, Version};
//!
//! let installed = Version::extract("Version: 1.1.107 (build 60792, linux64, headless)");
//! let installed = InstalledVersion::from(installed);
//! assert!(installed.needs_update_to(&"1.1.110".parse::<Version>().unwrap()));
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod probe;
pub mod release;
pub mod ui;
pub mod updater;
pub mod version;

pub use error::{Result, UpdaterError};
