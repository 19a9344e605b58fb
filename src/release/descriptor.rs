//! Release metadata types.

use serde::Deserialize;
use std::path::PathBuf;

use crate::version::Version;

/// Body of the latest-releases endpoint.
///
/// Only the stable headless entry is read; other channels and builds are
/// ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestReleases {
    pub stable: ChannelReleases,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelReleases {
    pub headless: String,
}

/// Identifies a published release and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Released version.
    pub version: Version,
    /// URL the artifact is downloaded from.
    pub artifact_url: String,
    /// Local filename for the artifact.
    pub filename: String,
}

impl ReleaseDescriptor {
    /// Build a descriptor, deriving the filename from product and version.
    pub fn new(product: &str, version: Version, artifact_url: impl Into<String>) -> Self {
        Self {
            version,
            artifact_url: artifact_url.into(),
            filename: artifact_filename(product, &version),
        }
    }
}

/// Artifact filename for a release, e.g. `factorio-headless_linux_1.2.3.tar.xz`.
pub fn artifact_filename(product: &str, version: &Version) -> String {
    format!("{}-headless_linux_{}.tar.xz", product, version)
}

/// A release artifact written to local storage.
///
/// Handed to the installer once complete; the caller decides whether to
/// delete it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    /// Location of the artifact on disk.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}
