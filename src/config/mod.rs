//! Configuration loading for the updater.
//!
//! - Schema definitions and defaults in [`schema`]
//! - File discovery, loading and command-line overrides in [`loader`]
//!
//! # Example
//!
//! ```
//! use factorio_updater::config::{parse_config, UpdaterConfig};
//! use std::path::Path;
//!
//! let config = parse_config("install_root: /srv/factorio", Path::new("inline")).unwrap();
//! assert_eq!(config.binary_path(), Path::new("/srv/factorio/factorio/bin/x64/factorio"));
//! assert_eq!(config.backup_suffix, UpdaterConfig::default().backup_suffix);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_file, parse_config, ConfigOverrides, SYSTEM_CONFIG_PATH,
};
pub use schema::{
    UpdaterConfig, DEFAULT_BACKUP_SUFFIX, DEFAULT_DOWNLOAD_URL, DEFAULT_INSTALL_ROOT,
    DEFAULT_METADATA_URL, DEFAULT_PRODUCT,
};
