//! Error types for the update engine.

use std::io;
use std::path::PathBuf;

use crate::package::VersionError;
use crate::patch::PatchError;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while fetching, patching or swapping packages.
#[derive(Debug)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to delete a file or directory.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Failed to rename a file or directory.
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// A file that must be created fresh already exists.
    AlreadyExists { path: PathBuf },

    /// Failed to fetch the manifest.
    ManifestFetchFailed { url: String, reason: String },

    /// Failed to parse the manifest.
    ManifestParseFailed { url: String, reason: String },

    /// Failed to download an archive or artifact.
    DownloadFailed { url: String, reason: String },

    /// Network timeout.
    Timeout { url: String, timeout_secs: u64 },

    /// HTTP client failure not tied to a single request.
    HttpError(String),

    /// A version string that is not dotted-numeric.
    MalformedVersion {
        package: String,
        source: VersionError,
    },

    /// A patch document that could not be parsed.
    MalformedPatch { path: PathBuf, source: PatchError },

    /// The manifest has no entry with this name.
    ModNotFound { name: String },

    /// The manifest offers no download for the running platform.
    UnsupportedPlatform { name: String, platform: String },

    /// Archive extraction failed.
    ExtractionFailed { path: PathBuf, reason: String },

    /// Extraction failed and the backup could not be moved back.
    ///
    /// The previous version is left at `backup` for manual recovery.
    PackageLost {
        name: String,
        backup: PathBuf,
        reason: String,
    },

    /// The operation was cancelled before completing.
    Cancelled,

    /// Invalid path provided.
    InvalidPath(String),
}

impl ManagerError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for ManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            Self::RenameFailed { from, to, source } => {
                write!(
                    f,
                    "failed to rename {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Self::AlreadyExists { path } => {
                write!(
                    f,
                    "{} already exists (left over from an interrupted update?)",
                    path.display()
                )
            }
            Self::ManifestFetchFailed { url, reason } => {
                write!(f, "failed to fetch manifest from {}: {}", url, reason)
            }
            Self::ManifestParseFailed { url, reason } => {
                write!(f, "failed to parse manifest from {}: {}", url, reason)
            }
            Self::DownloadFailed { url, reason } => {
                write!(f, "failed to download {}: {}", url, reason)
            }
            Self::Timeout { url, timeout_secs } => {
                write!(f, "request to {} timed out after {}s", url, timeout_secs)
            }
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::MalformedVersion { package, source } => {
                write!(f, "malformed version for {}: {}", package, source)
            }
            Self::MalformedPatch { path, source } => {
                write!(f, "malformed patch {}: {}", path.display(), source)
            }
            Self::ModNotFound { name } => write!(f, "mod not found in manifest: {}", name),
            Self::UnsupportedPlatform { name, platform } => {
                write!(f, "{} has no download for platform {}", name, platform)
            }
            Self::ExtractionFailed { path, reason } => {
                write!(f, "failed to extract {}: {}", path.display(), reason)
            }
            Self::PackageLost {
                name,
                backup,
                reason,
            } => {
                write!(
                    f,
                    "package {} could not be restored ({}); previous version left at {}",
                    name,
                    reason,
                    backup.display()
                )
            }
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::InvalidPath(msg) => write!(f, "invalid path: {}", msg),
        }
    }
}

impl std::error::Error for ManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::RemoveFailed { source, .. } => Some(source),
            Self::RenameFailed { source, .. } => Some(source),
            Self::MalformedVersion { source, .. } => Some(source),
            Self::MalformedPatch { source, .. } => Some(source),
            _ => None,
        }
    }
}
