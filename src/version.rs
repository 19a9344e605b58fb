//! Server version numbers and version string extraction.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Pattern the server prints for `--version`, e.g. `Version: 1.1.110 (build ...)`.
static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version: (\d+)\.(\d+)\.(\d+)").unwrap());

static VERSION_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").unwrap());

/// A released server version.
///
/// Ordering is lexicographic by component, so `1.9.9 < 2.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from free-form `--version` output.
    ///
    /// Returns `None` when no `Version: X.Y.Z` appears. The first match wins.
    pub fn extract(text: &str) -> Option<Self> {
        let caps = VERSION_LINE.captures(text)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error returned when a string is not of the form `X.Y.Z`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}', expected MAJOR.MINOR.PATCH")]
pub struct ParseVersionError(String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = VERSION_EXACT
            .captures(trimmed)
            .ok_or_else(|| ParseVersionError(s.to_string()))?;
        let part = |i: usize| {
            caps[i]
                .parse::<u64>()
                .map_err(|_| ParseVersionError(s.to_string()))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The version of the locally installed server, if it could be determined.
///
/// `Unknown` sorts below every known version, so an installation whose
/// version cannot be read is always considered out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstalledVersion {
    Unknown,
    Known(Version),
}

impl InstalledVersion {
    /// Whether `latest` should replace this installation.
    pub fn needs_update_to(&self, latest: &Version) -> bool {
        match self {
            Self::Unknown => true,
            Self::Known(current) => current < latest,
        }
    }

    pub fn known(&self) -> Option<Version> {
        match self {
            Self::Unknown => None,
            Self::Known(v) => Some(*v),
        }
    }
}

impl From<Option<Version>> for InstalledVersion {
    fn from(v: Option<Version>) -> Self {
        v.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Known(v) => v.fmt(f),
        }
    }
}
