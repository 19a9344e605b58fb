//! Release discovery and artifact retrieval.
//!
//! This module provides:
//! - [`ReleaseClient`] for querying the latest stable release and
//!   streaming its artifact to disk
//! - [`ReleaseDescriptor`] and [`DownloadedArtifact`] describing the
//!   release and the file it was written to

pub mod client;
pub mod descriptor;

pub use client::{ProgressCallback, ReleaseClient, CHUNK_SIZE};
pub use descriptor::{artifact_filename, DownloadedArtifact, ReleaseDescriptor};
