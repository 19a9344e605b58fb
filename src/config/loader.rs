//! Configuration file discovery and loading.
//!
//! Settings are layered, later layers overriding earlier ones:
//! 1. Built-in defaults
//! 2. A YAML config file (explicit path, or the system-wide file if present)
//! 3. Command-line overrides

use crate::config::schema::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use std::fs;
use std::path::{Path, PathBuf};

/// System-wide config file, read when no explicit path is given.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/factorio-updater.yml";

/// Values given on the command line, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub install_root: Option<PathBuf>,
    pub backup_suffix: Option<String>,
}

impl ConfigOverrides {
    /// Apply the set overrides to `config`.
    pub fn apply(&self, config: &mut UpdaterConfig) {
        if let Some(root) = &self.install_root {
            config.install_root = root.clone();
        }
        if let Some(suffix) = &self.backup_suffix {
            config.backup_suffix = suffix.clone();
        }
    }
}

/// Parse YAML content into an [`UpdaterConfig`].
///
/// `source_path` is only used for error reporting. An empty document is
/// the default configuration.
pub fn parse_config(content: &str, source_path: &Path) -> Result<UpdaterConfig> {
    if content.trim().is_empty() {
        return Ok(UpdaterConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| UpdaterError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<UpdaterConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UpdaterError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            UpdaterError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Load the effective configuration.
///
/// An explicit `config_path` must exist. Without one, the system-wide file
/// is used if present, and the defaults otherwise.
pub fn load_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<UpdaterConfig> {
    load_config_from(config_path, Path::new(SYSTEM_CONFIG_PATH), overrides)
}

fn load_config_from(
    config_path: Option<&Path>,
    system_path: &Path,
    overrides: &ConfigOverrides,
) -> Result<UpdaterConfig> {
    let mut config = match config_path {
        Some(path) => load_config_file(path)?,
        None if system_path.is_file() => load_config_file(system_path)?,
        None => UpdaterConfig::default(),
    };

    overrides.apply(&mut config);
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}
