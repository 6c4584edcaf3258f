//! Gate configuration.

use std::path::PathBuf;

use crate::manager::{BundleConfig, ManagerConfig};

/// Everything the gate needs to locate the manifest and the local install.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// URL of the manifest JSON.
    pub manifest_url: String,

    /// Plugin directory settings for package swaps.
    pub manager: ManagerConfig,

    /// UI directory settings for patch bundles.
    pub bundle: BundleConfig,
}

impl GateConfig {
    pub fn new(manifest_url: impl Into<String>, plugin_dir: PathBuf, ui_dir: PathBuf) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            manager: ManagerConfig::new(plugin_dir),
            bundle: BundleConfig::new(ui_dir),
        }
    }

    pub fn with_manager(mut self, manager: ManagerConfig) -> Self {
        self.manager = manager;
        self
    }

    pub fn with_bundle(mut self, bundle: BundleConfig) -> Self {
        self.bundle = bundle;
        self
    }
}
