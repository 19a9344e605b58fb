//! Update run states, stages and outcomes.

use std::fmt;

use crate::backup::BackupRecord;
use crate::error::UpdaterError;
use crate::release::{DownloadedArtifact, ReleaseDescriptor};
use crate::version::{InstalledVersion, Version};

/// States an update run passes through.
///
/// ```text
/// Idle → ProbedLocal → ProbedRemote → Decided ─┬─ up to date → (done)
///                                              └─ BackedUp → Downloaded → Installed
/// ```
///
/// Any step may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    ProbedLocal,
    ProbedRemote,
    Decided { update_needed: bool },
    /// `skipped` is true when no backup was taken.
    BackedUp { skipped: bool },
    Downloaded,
    Installed,
    Failed,
}

/// The step of a run that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ProbeLocal,
    FetchMetadata,
    Backup,
    Download,
    Install,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProbeLocal => "probe installed version",
            Self::FetchMetadata => "fetch release metadata",
            Self::Backup => "backup",
            Self::Download => "download",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a run found out before touching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Version currently installed.
    pub current: InstalledVersion,
    /// Latest published release.
    pub latest: ReleaseDescriptor,
}

impl UpdatePlan {
    pub fn update_needed(&self) -> bool {
        self.current.needs_update_to(&self.latest.version)
    }
}

/// Final result of an update run.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The installed version is the latest (or newer).
    UpToDate { version: Version, latest: Version },
    /// A new release was installed.
    Installed {
        previous: InstalledVersion,
        version: Version,
        backup: Option<BackupRecord>,
        artifact: DownloadedArtifact,
    },
    /// The run stopped at `stage`.
    Failed { stage: Stage, error: UpdaterError },
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// The error, if the run failed.
    pub fn error(&self) -> Option<&UpdaterError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate { .. } => f.write_str("up-to-date"),
            Self::Installed { .. } => f.write_str("installed"),
            Self::Failed { stage, error } => {
                write!(f, "failed: {} during {}: {}", error.kind(), stage, error)
            }
        }
    }
}
