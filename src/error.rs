//! Error types for updater operations.
//!
//! This module defines [`UpdaterError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each update stage fails with its own variant so callers can branch on
//!   the kind of failure without matching on message text
//! - Every variant carries the underlying cause as text for the operator
//! - Use `anyhow::Error` (via `UpdaterError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for updater operations.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// The server binary does not exist or is not executable.
    #[error("Server executable not found: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// The server binary ran but exited unsuccessfully.
    #[error("Version probe of {path} failed (exit code {code:?}): {stderr}")]
    ProbeExecution {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// The release metadata could not be fetched or understood.
    #[error("Release metadata error: {message}")]
    ReleaseMetadata { message: String },

    /// The release artifact could not be downloaded.
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// The installation could not be archived.
    #[error("Backup of {path} failed: {message}")]
    Backup { path: PathBuf, message: String },

    /// The artifact could not be read or unpacked.
    #[error("Extraction of {path} failed: {message}")]
    Extraction { path: PathBuf, message: String },

    /// The staged tree could not be moved into place.
    #[error("Swapping {path} into place failed: {message}")]
    Swap { path: PathBuf, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UpdaterError {
    /// Stable name of the error kind, used in `failed: <kind>` reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExecutableNotFound { .. } => "ExecutableNotFound",
            Self::ProbeExecution { .. } => "ProbeExecutionError",
            Self::ReleaseMetadata { .. } => "ReleaseMetadataError",
            Self::Download { .. } => "DownloadError",
            Self::Backup { .. } => "BackupError",
            Self::Extraction { .. } => "ExtractionError",
            Self::Swap { .. } => "SwapError",
            Self::ConfigNotFound { .. } => "ConfigNotFound",
            Self::ConfigParseError { .. } => "ConfigParseError",
            Self::Io(_) => "IoError",
            Self::Other(_) => "Error",
        }
    }

    /// Whether this error comes from configuration rather than an update stage.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. }
        )
    }
}

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, UpdaterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_not_found_displays_path() {
        let err = UpdaterError::ExecutableNotFound {
            path: PathBuf::from("/opt/factorio/factorio/bin/x64/factorio"),
        };
        assert!(err.to_string().contains("/opt/factorio/factorio/bin/x64/factorio"));
        assert_eq!(err.kind(), "ExecutableNotFound");
    }

    #[test]
    fn probe_execution_displays_code_and_stderr() {
        let err = UpdaterError::ProbeExecution {
            path: PathBuf::from("/bin/factorio"),
            code: Some(3),
            stderr: "missing data directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3"));
        assert!(msg.contains("missing data directory"));
        assert_eq!(err.kind(), "ProbeExecutionError");
    }

    #[test]
    fn release_metadata_displays_message() {
        let err = UpdaterError::ReleaseMetadata {
            message: "HTTP 500 Internal Server Error".into(),
        };
        assert!(err.to_string().contains("HTTP 500"));
        assert_eq!(err.kind(), "ReleaseMetadataError");
    }

    #[test]
    fn download_displays_url_and_message() {
        let err = UpdaterError::Download {
            url: "https://example.com/get".into(),
            message: "connection reset".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/get"));
        assert!(msg.contains("connection reset"));
        assert_eq!(err.kind(), "DownloadError");
    }

    #[test]
    fn stage_error_kinds_are_distinct() {
        let kinds = [
            UpdaterError::Backup {
                path: PathBuf::from("/a"),
                message: String::new(),
            }
            .kind(),
            UpdaterError::Extraction {
                path: PathBuf::from("/a"),
                message: String::new(),
            }
            .kind(),
            UpdaterError::Swap {
                path: PathBuf::from("/a"),
                message: String::new(),
            }
            .kind(),
        ];
        assert_eq!(kinds, ["BackupError", "ExtractionError", "SwapError"]);
    }

    #[test]
    fn config_errors_are_flagged() {
        let err = UpdaterError::ConfigNotFound {
            path: PathBuf::from("/etc/factorio-updater.yml"),
        };
        assert!(err.is_config_error());

        let err = UpdaterError::ReleaseMetadata {
            message: "x".into(),
        };
        assert!(!err.is_config_error());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: UpdaterError = io_err.into();
        assert!(matches!(err, UpdaterError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(UpdaterError::ReleaseMetadata {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
