//! Installed version detection.
//!
//! The server reports its own version when run with `--version`:
//!
//! ```text
//! Version: 1.1.110 (build 62093, linux64, headless)
//! Binary version: 64
//! ```
//!
//! [`VersionProbe`] runs the binary, captures stdout and extracts the
//! `Version: X.Y.Z` line. Output without that line is an unknown version,
//! not an error; a missing binary and a failing binary are errors, and are
//! kept apart so callers can treat a fresh install differently.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, UpdaterError};
use crate::version::{InstalledVersion, Version};

/// Flag that makes the server print its version and exit.
pub const VERSION_FLAG: &str = "--version";

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Runs the installed server binary to find out which version it is.
#[derive(Debug, Clone)]
pub struct VersionProbe {
    binary: PathBuf,
}

impl VersionProbe {
    /// Create a probe for the executable at `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the probed executable.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Determine the installed version.
    ///
    /// # Errors
    ///
    /// Returns `ExecutableNotFound` if the binary is missing or not
    /// executable, and `ProbeExecution` if it exits unsuccessfully.
    pub fn probe(&self) -> Result<InstalledVersion> {
        if !self.binary.is_file() || !is_executable(&self.binary) {
            return Err(UpdaterError::ExecutableNotFound {
                path: self.binary.clone(),
            });
        }

        tracing::debug!(binary = %self.binary.display(), "Probing installed version");

        let output = Command::new(&self.binary)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    UpdaterError::ExecutableNotFound {
                        path: self.binary.clone(),
                    }
                }
                _ => UpdaterError::ProbeExecution {
                    path: self.binary.clone(),
                    code: None,
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(UpdaterError::ProbeExecution {
                path: self.binary.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = InstalledVersion::from(Version::extract(&stdout));
        match version {
            InstalledVersion::Known(v) => tracing::info!("Installed version: {}", v),
            InstalledVersion::Unknown => tracing::warn!(
                "Could not read a version from `{} {}`",
                self.binary.display(),
                VERSION_FLAG
            ),
        }
        Ok(version)
    }
}
