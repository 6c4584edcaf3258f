//! Runtime configuration for the package manager and the bundle installer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::package::Platform;

/// Default extension of a package's binary artifact.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "dll";

/// Default name of the downloaded patch bundle archive.
pub const DEFAULT_BUNDLE_ARCHIVE: &str = "Patches.zip";

/// Default staging directory for extracted patch documents.
pub const DEFAULT_STAGING_DIR: &str = "mods";

/// Default root document of the UI.
pub const DEFAULT_ROOT_DOCUMENT: &str = "gateway.html";

/// Configuration for the Package Lifecycle Manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory holding package directories and binary artifacts.
    pub plugin_dir: PathBuf,

    /// Extension of binary artifacts, without the dot.
    pub artifact_extension: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Platform used to pick download URLs.
    ///
    /// `None` means only wildcard URLs can be used.
    pub platform: Option<Platform>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            plugin_dir: PathBuf::from("plugins"),
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            timeout: Duration::from_secs(300),
            platform: Platform::current(),
        }
    }
}

impl ManagerConfig {
    /// Create a configuration for the given plugin directory.
    pub fn new(plugin_dir: PathBuf) -> Self {
        Self {
            plugin_dir,
            ..Default::default()
        }
    }

    /// Set the artifact extension.
    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the detected platform.
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }
}

/// Configuration for the Patch Bundle Installer.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// UI asset directory; patch targets are relative to it.
    pub base_dir: PathBuf,

    /// Name of the staging directory under `base_dir`.
    pub staging_dir_name: String,

    /// File name of the downloaded archive under `base_dir`.
    pub archive_name: String,

    /// `/`-separated path of the root document relative to `base_dir`.
    pub root_document: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("ui"),
            staging_dir_name: DEFAULT_STAGING_DIR.to_string(),
            archive_name: DEFAULT_BUNDLE_ARCHIVE.to_string(),
            root_document: DEFAULT_ROOT_DOCUMENT.to_string(),
        }
    }
}

impl BundleConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            ..Default::default()
        }
    }

    pub fn with_root_document(mut self, root_document: impl Into<String>) -> Self {
        self.root_document = root_document.into();
        self
    }

    pub fn with_staging_dir_name(mut self, name: impl Into<String>) -> Self {
        self.staging_dir_name = name.into();
        self
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.base_dir.join(&self.staging_dir_name)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.base_dir.join(&self.archive_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
