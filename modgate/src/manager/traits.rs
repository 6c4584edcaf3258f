//! Trait definitions for the transport and archive seams.
//!
//! These traits enable dependency injection and testing of the update flow
//! without network access.

use std::path::Path;

use super::ManagerResult;

/// How a download treats an existing destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `AlreadyExists` if the destination exists.
    CreateNew,
    /// Replace any existing destination.
    Truncate,
}

/// Downloader for archives and artifacts.
pub trait PackageDownloader: Send + Sync {
    /// Download `url` to `dest`.
    ///
    /// # Returns
    ///
    /// The number of bytes written on success.
    fn download(&self, url: &str, dest: &Path, mode: WriteMode) -> ManagerResult<u64>;
}

/// Extractor for package archives.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract an archive into a directory, overwriting existing files.
    ///
    /// # Returns
    ///
    /// The number of files extracted on success.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize>;
}
