//! HTTP access to release metadata and artifacts.

use reqwest::blocking::{Client, Response};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::descriptor::{DownloadedArtifact, LatestReleases, ReleaseDescriptor};
use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::version::Version;

/// Size of the buffer reused for every chunk of a download.
pub const CHUNK_SIZE: usize = 8192;

/// Callback receiving `(bytes_written, total_bytes)` while downloading.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Fetches release metadata and downloads release artifacts.
///
/// # Example
///
/// ```no_run
/// use factorio_updater::config::UpdaterConfig;
/// use factorio_updater::release::ReleaseClient;
/// use std::path::Path;
///
/// let client = ReleaseClient::new(&UpdaterConfig::default()).unwrap();
/// let descriptor = client.fetch_latest_descriptor().unwrap();
/// let artifact = client
///     .download_artifact(&descriptor, Path::new("/tmp/factorio"), None)
///     .unwrap();
/// println!("{} bytes at {}", artifact.size, artifact.path.display());
/// ```
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
    product: String,
    metadata_url: String,
    download_url: String,
    timeout: Duration,
}

impl ReleaseClient {
    /// Create a client for the endpoints in `config`.
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        // The client timeout bounds each wait (response head, every body
        // read), so a stalled transfer fails while a slow one keeps going.
        // Metadata requests additionally cap the whole exchange.
        let client = Client::builder()
            .user_agent(concat!("factorio-updater/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            product: config.product.clone(),
            metadata_url: config.metadata_url.clone(),
            download_url: config.download_url.clone(),
            timeout,
        })
    }

    /// Get the configured metadata request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the latest stable headless release.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseMetadata` for transport failures, non-200 statuses and
    /// bodies without a valid `stable.headless` version.
    pub fn fetch_latest_descriptor(&self) -> Result<ReleaseDescriptor> {
        tracing::debug!(url = %self.metadata_url, "Fetching release metadata");

        let metadata_error = |message: String| UpdaterError::ReleaseMetadata { message };

        let response = self
            .client
            .get(&self.metadata_url)
            .timeout(self.timeout)
            .send()
            .map_err(|e| {
                metadata_error(format!("request to {} failed: {}", self.metadata_url, e))
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(metadata_error(format!(
                "HTTP {} fetching {}",
                response.status(),
                self.metadata_url
            )));
        }

        let body = response
            .text()
            .map_err(|e| metadata_error(format!("failed to read response body: {}", e)))?;

        let latest: LatestReleases = serde_json::from_str(&body)
            .map_err(|e| metadata_error(format!("unexpected metadata shape: {}", e)))?;

        let version: Version = latest
            .stable
            .headless
            .parse()
            .map_err(|e| metadata_error(format!("stable.headless: {}", e)))?;

        tracing::info!("Latest stable release: {}", version);
        Ok(ReleaseDescriptor::new(
            &self.product,
            version,
            self.download_url.clone(),
        ))
    }

    /// Stream the artifact for `descriptor` into `destination_dir`.
    ///
    /// The body is copied through a single fixed-size buffer, so memory use
    /// does not depend on the artifact size. `destination_dir` is created if
    /// needed.
    ///
    /// Bytes go to `<filename>.part`, which is renamed to `<filename>` only
    /// once the body is complete. On failure the `.part` file is removed and
    /// an existing `<filename>` is never touched.
    pub fn download_artifact(
        &self,
        descriptor: &ReleaseDescriptor,
        destination_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<DownloadedArtifact> {
        let url = descriptor.artifact_url.as_str();
        let download_error = |message: String| UpdaterError::Download {
            url: url.to_string(),
            message,
        };

        tracing::debug!(%url, "Downloading {}", descriptor.filename);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| download_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        fs::create_dir_all(destination_dir).map_err(|e| {
            download_error(format!(
                "cannot create {}: {}",
                destination_dir.display(),
                e
            ))
        })?;

        let path = destination_dir.join(&descriptor.filename);
        let part = partial_path(&path);
        let file = File::create(&part)
            .map_err(|e| download_error(format!("cannot create {}: {}", part.display(), e)))?;

        let streamed = stream_to_file(response, file, progress).and_then(|size| {
            fs::rename(&part, &path)
                .map(|()| size)
                .map_err(|e| format!("cannot move {} into place: {}", part.display(), e))
        });
        let size = match streamed {
            Ok(size) => size,
            Err(message) => {
                if let Err(e) = fs::remove_file(&part) {
                    tracing::warn!("Could not remove {}: {}", part.display(), e);
                }
                return Err(download_error(message));
            }
        };

        tracing::info!("Downloaded {} ({} bytes)", path.display(), size);
        Ok(DownloadedArtifact { path, size })
    }
}

/// Where an in-progress download of `path` is written.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn stream_to_file(
    mut response: Response,
    mut file: File,
    mut progress: Option<ProgressCallback<'_>>,
) -> std::result::Result<u64, String> {
    let total = response.content_length();
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(format!("connection failed after {} bytes: {}", written, e)),
        };
        file.write_all(&buf[..n])
            .map_err(|e| format!("write failed after {} bytes: {}", written, e))?;
        written += n as u64;
        if let Some(cb) = progress.as_mut() {
            cb(written, total);
        }
    }

    if let Some(expected) = total {
        if written != expected {
            return Err(format!("body ended after {} of {} bytes", written, expected));
        }
    }

    file.sync_all()
        .map_err(|e| format!("failed to flush artifact: {}", e))?;
    Ok(written)
}
