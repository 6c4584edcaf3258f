//! Configuration file settings.

use std::path::PathBuf;
use std::time::Duration;

use super::file::ConfigFileError;
use crate::gate::GateConfig;
use crate::manager::{
    BundleConfig, ManagerConfig, DEFAULT_ARTIFACT_EXTENSION, DEFAULT_ROOT_DOCUMENT,
    DEFAULT_STAGING_DIR,
};
use crate::manifest::DEFAULT_TIMEOUT_SECS;

/// Default HTTP timeout for the manifest and downloads, in seconds.
pub const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// `[manifest]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestSettings {
    /// Empty when not configured.
    pub url: String,
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

/// `[paths]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSettings {
    pub plugin_dir: Option<PathBuf>,
    pub ui_dir: Option<PathBuf>,
}

/// `[patches]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchSettings {
    pub root_document: String,
    pub staging_dir: String,
}

/// `[packages]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSettings {
    pub artifact_extension: String,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub manifest: ManifestSettings,
    pub paths: PathSettings,
    pub patches: PatchSettings,
    pub packages: PackageSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            manifest: ManifestSettings {
                url: String::new(),
                timeout: DEFAULT_MANIFEST_TIMEOUT_SECS,
            },
            paths: PathSettings::default(),
            patches: PatchSettings {
                root_document: DEFAULT_ROOT_DOCUMENT.to_string(),
                staging_dir: DEFAULT_STAGING_DIR.to_string(),
            },
            packages: PackageSettings {
                artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            },
        }
    }
}

fn missing(section: &str, key: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: String::new(),
        reason: "must be set".to_string(),
    }
}

impl ConfigFile {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.manifest.timeout)
    }

    /// Package manager settings. Requires `[paths] plugin_dir`.
    pub fn to_manager_config(&self) -> Result<ManagerConfig, ConfigFileError> {
        let plugin_dir = self
            .paths
            .plugin_dir
            .clone()
            .ok_or_else(|| missing("paths", "plugin_dir"))?;
        Ok(ManagerConfig::new(plugin_dir)
            .with_artifact_extension(self.packages.artifact_extension.clone())
            .with_timeout(self.timeout()))
    }

    /// Bundle installer settings. Requires `[paths] ui_dir`.
    pub fn to_bundle_config(&self) -> Result<BundleConfig, ConfigFileError> {
        let ui_dir = self
            .paths
            .ui_dir
            .clone()
            .ok_or_else(|| missing("paths", "ui_dir"))?;
        Ok(BundleConfig::new(ui_dir)
            .with_root_document(self.patches.root_document.clone())
            .with_staging_dir_name(self.patches.staging_dir.clone()))
    }

    /// Full gate settings. Requires the manifest URL and both directories.
    pub fn to_gate_config(&self) -> Result<GateConfig, ConfigFileError> {
        if self.manifest.url.is_empty() {
            return Err(missing("manifest", "url"));
        }
        let manager = self.to_manager_config()?;
        let bundle = self.to_bundle_config()?;
        Ok(GateConfig {
            manifest_url: self.manifest.url.clone(),
            manager,
            bundle,
        })
    }
}
