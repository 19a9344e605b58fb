//! Installing a downloaded release over the live tree.
//!
//! The artifact is never unpacked onto the live directory. It is extracted
//! into a staging directory next to it, checked, and then renamed into
//! place:
//!
//! ```text
//! <root>/.factorio-staging-<id>/factorio   extracted release
//! <root>/factorio                          live tree  -> .factorio-previous-<id>
//! <root>/.factorio-staging-<id>/factorio   -> <root>/factorio
//! ```
//!
//! Until the final rename the live tree is untouched, so a corrupt or
//! truncated artifact leaves the installation exactly as it was. Both
//! renames stay inside `<root>` and therefore on one filesystem.
//!
//! Directories left behind by a run that was killed mid-install are cleaned
//! up before the next install. A moved-aside tree is put back if the live
//! directory is missing.

use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use xz2::read::XzDecoder;

use crate::error::{Result, UpdaterError};

/// Replaces the live product directory with the contents of an artifact.
#[derive(Debug, Clone)]
pub struct InstallationSwapper {
    root: PathBuf,
    product: String,
    preserve: Vec<String>,
}

impl InstallationSwapper {
    /// Swapper for `<root>/<product>`, with nothing preserved.
    pub fn new(root: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            product: product.into(),
            preserve: Vec::new(),
        }
    }

    /// Entries of the live tree to copy into the new one (relative paths).
    pub fn with_preserve(mut self, preserve: Vec<String>) -> Self {
        self.preserve = preserve;
        self
    }

    /// The live product directory.
    pub fn live_dir(&self) -> PathBuf {
        self.root.join(&self.product)
    }

    /// Install the tar.xz at `artifact`, returning the live directory.
    ///
    /// # Errors
    ///
    /// Returns `Extraction` when the artifact cannot be unpacked or lacks a
    /// top-level `<product>/` directory, and `Swap` when moving the trees
    /// fails. In both cases the live directory is left as it was.
    pub fn install(&self, artifact: &Path) -> Result<PathBuf> {
        let id = format!(
            "{}-{}",
            Local::now().format("%Y%m%d%H%M%S"),
            std::process::id()
        );
        let staging = self.root.join(format!(".{}-staging-{}", self.product, id));
        let previous = self.root.join(format!(".{}-previous-{}", self.product, id));
        let live = self.live_dir();

        self.recover_leftovers();

        let result = self.stage(artifact, &staging).and_then(|staged| {
            self.carry_over(&live, &staged)?;
            self.swap(&staged, &live, &previous)
        });

        remove_quietly(&staging);
        result?;
        remove_quietly(&previous);

        tracing::info!("Installed {} into {}", artifact.display(), live.display());
        Ok(live)
    }

    fn recover_leftovers(&self) {
        let staging_prefix = format!(".{}-staging-", self.product);
        let previous_prefix = format!(".{}-previous-", self.product);
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(&staging_prefix) || n.starts_with(&previous_prefix))
            .collect();
        // Newest first, so the latest moved-aside tree wins a restore.
        names.sort();

        let live = self.live_dir();
        for name in names.iter().rev() {
            let path = self.root.join(name);
            if name.starts_with(&previous_prefix) && fs::symlink_metadata(&live).is_err() {
                match fs::rename(&path, &live) {
                    Ok(()) => tracing::warn!(
                        "Restored {} from interrupted install {}",
                        live.display(),
                        path.display()
                    ),
                    Err(e) => tracing::error!(
                        "Could not restore {} from {}: {}",
                        live.display(),
                        path.display(),
                        e
                    ),
                }
                continue;
            }
            tracing::info!("Removing leftover {}", path.display());
            remove_quietly(&path);
        }
    }

    /// Extract `artifact` into `staging` and return the staged product dir.
    fn stage(&self, artifact: &Path, staging: &Path) -> Result<PathBuf> {
        let extraction_error = |message: String| UpdaterError::Extraction {
            path: artifact.to_path_buf(),
            message,
        };

        fs::create_dir_all(staging).map_err(|e| {
            extraction_error(format!("cannot create {}: {}", staging.display(), e))
        })?;

        tracing::debug!(staging = %staging.display(), "Extracting {}", artifact.display());

        let file = File::open(artifact).map_err(|e| extraction_error(e.to_string()))?;
        let mut archive = tar::Archive::new(XzDecoder::new(file));
        archive.set_preserve_permissions(true);
        archive
            .unpack(staging)
            .map_err(|e| extraction_error(e.to_string()))?;

        let staged = staging.join(&self.product);
        if !staged.is_dir() {
            return Err(extraction_error(format!(
                "archive has no top-level '{}/' directory",
                self.product
            )));
        }
        Ok(staged)
    }

    /// Copy preserved entries from the live tree into the staged tree.
    fn carry_over(&self, live: &Path, staged: &Path) -> Result<()> {
        if !live.is_dir() {
            return Ok(());
        }

        for name in &self.preserve {
            let src = live.join(name);
            if fs::symlink_metadata(&src).is_err() {
                continue;
            }
            let dst = staged.join(name);
            tracing::debug!("Preserving {}", name);

            let copied = remove_path(&dst).and_then(|()| {
                if let Some(parent) = dst.parent() {
                    fs::create_dir_all(parent)?;
                }
                copy_path(&src, &dst)
            });
            copied.map_err(|e| UpdaterError::Swap {
                path: src.clone(),
                message: format!("cannot carry over into new installation: {}", e),
            })?;
        }
        Ok(())
    }

    fn swap(&self, staged: &Path, live: &Path, previous: &Path) -> Result<()> {
        let swap_error = |path: &Path, message: String| UpdaterError::Swap {
            path: path.to_path_buf(),
            message,
        };

        let had_live = fs::symlink_metadata(live).is_ok();
        if had_live {
            fs::rename(live, previous).map_err(|e| {
                swap_error(
                    live,
                    format!("cannot move aside to {}: {}", previous.display(), e),
                )
            })?;
        }

        if let Err(e) = fs::rename(staged, live) {
            if had_live {
                if let Err(restore) = fs::rename(previous, live) {
                    tracing::error!(
                        "Could not restore {} from {}: {}",
                        live.display(),
                        previous.display(),
                        restore
                    );
                }
            }
            return Err(swap_error(
                live,
                format!("cannot move new release into place: {}", e),
            ));
        }
        Ok(())
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = remove_path(path) {
        tracing::warn!("Could not remove {}: {}", path.display(), e);
    }
}

fn copy_path(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(src)?;

    #[cfg(unix)]
    if meta.file_type().is_symlink() {
        return std::os::unix::fs::symlink(fs::read_link(src)?, dst);
    }

    if meta.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_path(&entry.path(), &dst.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}
