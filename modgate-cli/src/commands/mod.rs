//! Command implementations.

pub mod check;
pub mod cleanup;
pub mod config;
pub mod packages;
pub mod patch;

pub use config::ConfigCommands;
pub use patch::PatchCommands;

use std::path::PathBuf;
use std::sync::Arc;

use modgate::config::{config_directory, ConfigFile};
use modgate::log::{Logger, TracingLogger};
use modgate::logging::{default_log_file, LoggingGuard};
use modgate::manager::{
    BundleConfig, HttpDownloader, ManagerConfig, PackageLifecycleManager, PatchBundleInstaller,
    ZipExtractor,
};
use modgate::manifest::{HttpManifestClient, Manifest, ManifestClient};

use crate::error::CliError;

/// Install the tracing subscriber, logging to `~/.modgate/modgate.log`.
pub fn init_logging() -> Result<LoggingGuard, CliError> {
    modgate::logging::init_logging(&config_directory(), default_log_file())
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

/// Config file values with command-line overrides applied.
pub struct Settings {
    pub config: ConfigFile,
    pub logger: Arc<dyn Logger>,
}

impl Settings {
    pub fn load(
        path: Option<PathBuf>,
        manifest_url: Option<String>,
        plugin_dir: Option<PathBuf>,
        ui_dir: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let mut config = match path {
            Some(path) => ConfigFile::load_from(&path)?,
            None => ConfigFile::load()?,
        };

        // CLI takes precedence, then config
        if let Some(url) = manifest_url {
            config.manifest.url = url;
        }
        if plugin_dir.is_some() {
            config.paths.plugin_dir = plugin_dir;
        }
        if ui_dir.is_some() {
            config.paths.ui_dir = ui_dir;
        }

        Ok(Self {
            config,
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn manager_config(&self) -> Result<ManagerConfig, CliError> {
        Ok(self.config.to_manager_config()?)
    }

    pub fn bundle_config(&self) -> Result<BundleConfig, CliError> {
        Ok(self.config.to_bundle_config()?)
    }

    pub fn package_manager(&self) -> Result<PackageLifecycleManager, CliError> {
        let config = self.manager_config()?;
        let downloader = HttpDownloader::with_timeout(config.timeout);
        Ok(PackageLifecycleManager::new(
            config,
            Arc::new(downloader),
            Arc::new(ZipExtractor::new()),
            Arc::clone(&self.logger),
        ))
    }

    pub fn bundle_installer(&self) -> Result<PatchBundleInstaller, CliError> {
        Ok(PatchBundleInstaller::new(
            self.bundle_config()?,
            Arc::new(HttpDownloader::with_timeout(self.config.timeout())),
            Arc::new(ZipExtractor::new()),
            Arc::clone(&self.logger),
        ))
    }

    pub fn fetch_manifest(&self) -> Result<Manifest, CliError> {
        if self.config.manifest.url.is_empty() {
            return Err(CliError::Config(
                "No manifest URL specified. Use --manifest-url or set url in config.ini [manifest] section."
                    .to_string(),
            ));
        }
        let client = HttpManifestClient::with_timeout(self.config.timeout());
        Ok(client.fetch_manifest(&self.config.manifest.url)?)
    }
}
