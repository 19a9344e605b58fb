//! Configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default installation root.
pub const DEFAULT_INSTALL_ROOT: &str = "/opt/factorio";

/// Default backup directory, relative to the installation root.
pub const DEFAULT_BACKUP_SUFFIX: &str = "Backups";

/// Default product name; also the name of the live directory under the root.
pub const DEFAULT_PRODUCT: &str = "factorio";

/// Endpoint listing the latest releases per channel.
pub const DEFAULT_METADATA_URL: &str = "https://factorio.com/api/latest-releases";

/// Endpoint serving the latest stable headless Linux build.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://factorio.com/get-download/stable/headless/linux64";

/// Updater configuration.
///
/// Every field has a default so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Directory holding the server installation.
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Backup directory, joined onto the installation root.
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,

    /// Product name used for the binary path and artifact filenames.
    #[serde(default = "default_product")]
    pub product: String,

    /// Release metadata endpoint.
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Artifact download endpoint.
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Where downloaded artifacts are stored (defaults to the installation root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Request timeout for metadata requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Entries of the live tree carried over into a new installation.
    #[serde(default = "default_preserve")]
    pub preserve: Vec<String>,
}

fn default_install_root() -> PathBuf {
    PathBuf::from(DEFAULT_INSTALL_ROOT)
}

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

fn default_product() -> String {
    DEFAULT_PRODUCT.to_string()
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_URL.to_string()
}

fn default_download_url() -> String {
    DEFAULT_DOWNLOAD_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_preserve() -> Vec<String> {
    [
        "saves",
        "mods",
        "config",
        "server-settings.json",
        "server-adminlist.json",
        "server-banlist.json",
        "server-whitelist.json",
        "player-data.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            backup_suffix: default_backup_suffix(),
            product: default_product(),
            metadata_url: default_metadata_url(),
            download_url: default_download_url(),
            download_dir: None,
            timeout_secs: default_timeout_secs(),
            preserve: default_preserve(),
        }
    }
}

impl UpdaterConfig {
    /// Config for an installation at `root`, all other settings default.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: root.into(),
            ..Self::default()
        }
    }

    /// The live product directory, e.g. `/opt/factorio/factorio`.
    pub fn product_dir(&self) -> PathBuf {
        self.install_root.join(&self.product)
    }

    /// The server executable, e.g. `/opt/factorio/factorio/bin/x64/factorio`.
    pub fn binary_path(&self) -> PathBuf {
        self.product_dir()
            .join("bin")
            .join("x64")
            .join(&self.product)
    }

    /// Directory receiving backup archives.
    ///
    /// A leading `/` on the suffix is ignored so `/Backups` still lands
    /// under the installation root.
    pub fn backup_dir(&self) -> PathBuf {
        self.install_root
            .join(self.backup_suffix.trim_start_matches('/'))
    }

    /// Directory receiving downloaded artifacts.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| self.install_root.clone())
    }
}
