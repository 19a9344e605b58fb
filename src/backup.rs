//! Pre-update snapshots of the installation.
//!
//! A backup is a single `YYYY-MM-DD_HH-MM-SS.tar.xz` archive of the live
//! product directory, compressed with the fastest xz preset.

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use xz2::write::XzEncoder;

use crate::error::{Result, UpdaterError};

/// xz preset used for backups (fastest, lowest ratio).
pub const BACKUP_COMPRESSION_LEVEL: u32 = 1;

/// Timestamp format of backup archive names.
pub const BACKUP_NAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A completed backup archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Directory that was archived.
    pub source: PathBuf,
    /// The archive file.
    pub archive: PathBuf,
    /// When the backup was started.
    pub created_at: DateTime<Local>,
    /// Archive size in bytes.
    pub size: u64,
}

/// Writes backup archives into a backup directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Archive `source` into a new timestamped backup.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if `source` does not exist or the archive cannot be
    /// written. `source` is only ever read.
    pub fn backup(&self, source: &Path) -> Result<BackupRecord> {
        self.backup_at(source, Local::now())
    }

    /// Archive `source` using `now` as the backup timestamp.
    ///
    /// Two backups within the same second share a name; the later one
    /// replaces the earlier.
    pub fn backup_at(&self, source: &Path, now: DateTime<Local>) -> Result<BackupRecord> {
        let backup_error = |message: String| UpdaterError::Backup {
            path: source.to_path_buf(),
            message,
        };

        if !source.is_dir() {
            return Err(backup_error("source directory does not exist".to_string()));
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            backup_error(format!(
                "cannot create {}: {}",
                self.backup_dir.display(),
                e
            ))
        })?;

        let archive = self.backup_dir.join(archive_name(&now));
        tracing::info!(
            "Backing up {} to {}",
            source.display(),
            archive.display()
        );

        match write_archive(source, &archive) {
            Ok(size) => {
                tracing::info!("Backup complete ({} bytes)", size);
                Ok(BackupRecord {
                    source: source.to_path_buf(),
                    archive,
                    created_at: now,
                    size,
                })
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&archive) {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove incomplete backup {}: {}",
                            archive.display(),
                            rm
                        );
                    }
                }
                Err(backup_error(format!(
                    "writing {} failed: {}",
                    archive.display(),
                    e
                )))
            }
        }
    }
}

/// Archive filename for a backup taken at `at`.
pub fn archive_name(at: &DateTime<Local>) -> String {
    format!("{}.tar.xz", at.format(BACKUP_NAME_FORMAT))
}

/// Write `source` as `<dir name>/...` into an xz-compressed tar at `archive`.
fn write_archive(source: &Path, archive: &Path) -> std::io::Result<u64> {
    let entry_name = source
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let file = File::create(archive)?;
    let encoder = XzEncoder::new(file, BACKUP_COMPRESSION_LEVEL);
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(&entry_name, source)?;

    let file = builder.into_inner()?.finish()?;
    file.sync_all()?;
    Ok(file.metadata()?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;
    use tempfile::TempDir;
    use xz2::read::XzDecoder;

    fn make_install(root: &Path) -> PathBuf {
        let product = root.join("factorio");
        fs::create_dir_all(product.join("bin/x64")).unwrap();
        fs::create_dir_all(product.join("saves")).unwrap();
        fs::write(product.join("bin/x64/factorio"), b"binary").unwrap();
        fs::write(product.join("saves/world.zip"), b"save data").unwrap();
        product
    }

    fn entries(archive: &Path) -> Vec<String> {
        let file = File::open(archive).unwrap();
        let mut tar = tar::Archive::new(XzDecoder::new(file));
        tar.entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn archive_name_format() {
        let at = Local.with_ymd_and_hms(2024, 11, 11, 9, 5, 3).unwrap();
        assert_eq!(archive_name(&at), "2024-11-11_09-05-03.tar.xz");
    }

    #[test]
    fn backup_creates_dir_and_archive() {
        let temp = TempDir::new().unwrap();
        let source = make_install(temp.path());
        let backup_dir = temp.path().join("Backups");
        let manager = BackupManager::new(&backup_dir);

        let record = manager.backup(&source).unwrap();

        assert!(backup_dir.is_dir());
        assert!(record.archive.starts_with(&backup_dir));
        assert!(record.archive.to_string_lossy().ends_with(".tar.xz"));
        assert!(record.size > 0);
        assert_eq!(fs::metadata(&record.archive).unwrap().len(), record.size);
        assert_eq!(record.source, source);
    }

    #[test]
    fn backup_preserves_structure_under_product_name() {
        let temp = TempDir::new().unwrap();
        let source = make_install(temp.path());
        let manager = BackupManager::new(temp.path().join("Backups"));

        let record = manager.backup(&source).unwrap();
        let names = entries(&record.archive);

        assert!(names.iter().any(|n| n == "factorio/bin/x64/factorio"), "{names:?}");
        assert!(names.iter().any(|n| n == "factorio/saves/world.zip"), "{names:?}");

        let file = File::open(&record.archive).unwrap();
        let mut tar = tar::Archive::new(XzDecoder::new(file));
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.path().unwrap().ends_with("saves/world.zip") {
                let mut content = String::new();
                entry.read_to_string(&mut content).unwrap();
                assert_eq!(content, "save data");
            }
        }
    }

    #[test]
    fn backup_of_missing_source_fails_without_creating_anything() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("Backups");
        let manager = BackupManager::new(&backup_dir);

        let err = manager.backup(&temp.path().join("factorio")).unwrap_err();

        assert!(matches!(err, UpdaterError::Backup { .. }));
        assert!(!backup_dir.exists());
    }

    #[test]
    fn unwritable_backup_dir_fails_and_leaves_source() {
        let temp = TempDir::new().unwrap();
        let source = make_install(temp.path());
        // A regular file where the backup directory should be.
        let blocker = temp.path().join("Backups");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = BackupManager::new(&blocker).backup(&source).unwrap_err();

        assert_eq!(err.kind(), "BackupError");
        assert_eq!(
            fs::read(source.join("saves/world.zip")).unwrap(),
            b"save data"
        );
    }

    #[test]
    fn same_second_backup_replaces_previous() {
        let temp = TempDir::new().unwrap();
        let source = make_install(temp.path());
        let manager = BackupManager::new(temp.path().join("Backups"));
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let first = manager.backup_at(&source, at).unwrap();
        fs::write(source.join("saves/second.zip"), b"more").unwrap();
        let second = manager.backup_at(&source, at).unwrap();

        assert_eq!(first.archive, second.archive);
        assert_eq!(fs::read_dir(manager.backup_dir()).unwrap().count(), 1);
        assert!(entries(&second.archive)
            .iter()
            .any(|n| n == "factorio/saves/second.zip"));
    }
}
