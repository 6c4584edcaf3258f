//! The host-facing engine.
//!
//! A [`Gate`] ties the manifest, the patch bundle installer and the package
//! lifecycle manager to the host's capabilities. Hosts call two methods:
//!
//! - [`Gate::on_load`] starts the update check on the blocking pool and
//!   returns an [`UpdateHandle`]
//! - [`Gate::on_unload`] cancels a running check and deletes every shadow file
//!
//! # Update flow
//!
//! 1. Remove shadow files left behind by an earlier session
//! 2. Fetch the manifest and broadcast the mods to the host UI
//! 3. Deliver the core's UI changes (patch bundle or legacy injection)
//! 4. Redirect the root document to its shadow, if one was written
//! 5. Version-gate every manifest entry against the installed packages.
//!    Mods are swapped when newer; the core is only compared
//!
//! Errors never leave the flow. They are logged and recorded in the
//! [`UpdateReport`].

mod config;
mod error;
mod handle;
mod report;

pub use config::GateConfig;
pub use error::GateError;
pub use handle::UpdateHandle;
pub use report::{CoreOutcome, PackageReport, UpdateReport};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::host::{EventSink, PackageRegistry, PathRedirector, UPDATED_MODS_EVENT};
use crate::log::Logger;
use crate::manager::{
    ArchiveExtractor, HttpDownloader, ManagerError, PackageDownloader, PackageLifecycleManager,
    PatchBundleInstaller, ZipExtractor,
};
use crate::manifest::{CoreDelivery, HttpManifestClient, Manifest, ManifestClient, ManifestEntry};
use crate::package::find_record;
use crate::shadow::CleanupReport;
use crate::{log_debug, log_error, log_info, log_warn};

use handle::InFlightGuard;

/// Capabilities provided by the host application.
#[derive(Clone)]
pub struct HostCapabilities {
    pub registry: Arc<dyn PackageRegistry>,
    pub redirector: Arc<dyn PathRedirector>,
    pub events: Arc<dyn EventSink>,
}

/// Network and archive implementations used by the gate.
#[derive(Clone)]
pub struct Transport {
    pub manifest: Arc<dyn ManifestClient>,
    pub downloader: Arc<dyn PackageDownloader>,
    pub extractor: Arc<dyn ArchiveExtractor>,
}

impl Transport {
    /// HTTP transport with zip extraction.
    pub fn http(timeout: Duration) -> Self {
        Self {
            manifest: Arc::new(HttpManifestClient::with_timeout(timeout)),
            downloader: Arc::new(HttpDownloader::with_timeout(timeout)),
            extractor: Arc::new(ZipExtractor::new()),
        }
    }
}

/// State shared with the update task.
struct GateInner {
    config: GateConfig,
    manifest_client: Arc<dyn ManifestClient>,
    host: HostCapabilities,
    bundle: PatchBundleInstaller,
    packages: PackageLifecycleManager,
    logger: Arc<dyn Logger>,
}

/// Update engine bound to one host.
pub struct Gate {
    inner: Arc<GateInner>,
    in_flight: Arc<AtomicBool>,
    current: Mutex<Option<CancellationToken>>,
}

impl Gate {
    pub fn new(
        config: GateConfig,
        host: HostCapabilities,
        transport: Transport,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let bundle = PatchBundleInstaller::new(
            config.bundle.clone(),
            Arc::clone(&transport.downloader),
            Arc::clone(&transport.extractor),
            Arc::clone(&logger),
        );
        let packages = PackageLifecycleManager::new(
            config.manager.clone(),
            transport.downloader,
            transport.extractor,
            Arc::clone(&logger),
        );

        Self {
            inner: Arc::new(GateInner {
                config,
                manifest_client: transport.manifest,
                host,
                bundle,
                packages,
                logger,
            }),
            in_flight: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }

    /// The package manager, for explicit install/uninstall/activate/deactivate.
    pub fn packages(&self) -> &PackageLifecycleManager {
        &self.inner.packages
    }

    pub fn bundle(&self) -> &PatchBundleInstaller {
        &self.inner.bundle
    }

    /// Fetch and parse the manifest.
    pub fn fetch_manifest(&self) -> Result<Manifest, ManagerError> {
        self.inner
            .manifest_client
            .fetch_manifest(&self.inner.config.manifest_url)
    }

    /// Whether an update check is running.
    pub fn is_updating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start the update check on the tokio blocking pool.
    ///
    /// # Errors
    ///
    /// `UpdateInProgress` if a check is already running, `NoRuntime` when
    /// called outside a tokio runtime.
    pub fn on_load(&self) -> Result<UpdateHandle, GateError> {
        let runtime = Handle::try_current().map_err(|_| GateError::NoRuntime)?;
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(GateError::UpdateInProgress)?;

        let cancellation = CancellationToken::new();
        *self.current.lock() = Some(cancellation.clone());

        let inner = Arc::clone(&self.inner);
        let token = cancellation.clone();
        let task = runtime.spawn_blocking(move || {
            let _guard = guard;
            inner.run(&token)
        });

        Ok(UpdateHandle::new(task, cancellation))
    }

    /// Run the update check on the calling thread.
    pub fn check_now(&self, cancel: &CancellationToken) -> Result<UpdateReport, GateError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(GateError::UpdateInProgress)?;
        *self.current.lock() = Some(cancel.clone());
        Ok(self.inner.run(cancel))
    }

    /// Cancel a running check and delete every shadow file.
    ///
    /// A running check stops at its next checkpoint; a shadow it writes
    /// before reaching it is removed by the next session's cleanup.
    pub fn on_unload(&self) -> CleanupReport {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
        let report = self.inner.bundle.cleanup();
        for (path, reason) in &report.failed {
            log_warn!(self.inner.logger, "Could not remove {}: {}", path.display(), reason);
        }
        report
    }
}

impl GateInner {
    fn run(&self, cancel: &CancellationToken) -> UpdateReport {
        let mut report = UpdateReport::default();

        let stale = self.bundle.cleanup();
        if !stale.removed.is_empty() {
            log_debug!(self.logger, "Removed {} stale shadow files", stale.removed.len());
        }

        let manifest = match self.manifest_client.fetch_manifest(&self.config.manifest_url) {
            Ok(manifest) => manifest,
            Err(e) => {
                log_error!(self.logger, "Error during update check: {}", e);
                report.manifest_error = Some(e);
                return report;
            }
        };
        self.host.events.trigger(UPDATED_MODS_EVENT, &manifest.mods_json());

        if cancel.is_cancelled() {
            report.cancelled = true;
            return report;
        }

        let core = self.deliver_core(&manifest, cancel);
        let core_cancelled = match &core {
            CoreOutcome::Bundle(Err(e)) | CoreOutcome::Injected(Err(e)) => e.is_cancelled(),
            _ => false,
        };
        report.core = Some(core);
        if core_cancelled {
            report.cancelled = true;
            return report;
        }

        let root_shadow = self.bundle.store().root_shadow_path();
        if root_shadow.is_file() {
            let original = self.bundle.store().root_original_path();
            self.host.redirector.register_path_redirect(&original, &root_shadow);
            report.redirect_registered = true;
            log_debug!(self.logger, "Redirected {} to {}", original.display(), root_shadow.display());
        }

        let installed = self.host.registry.installed_packages();
        for entry in manifest.entries() {
            let name = entry.name();
            if name.is_empty() {
                continue;
            }
            let record = find_record(&installed, name);
            // The core's content is the patch bundle delivered above.
            let outcome = match entry {
                ManifestEntry::CorePatchBundle(core) => {
                    self.packages.check_version(&core.identity, record)
                }
                ManifestEntry::InstallablePackage(descriptor) => {
                    self.packages.check_and_update(descriptor, record, cancel)
                }
            };

            match &outcome {
                Err(e) if e.is_cancelled() => {
                    report.cancelled = true;
                    break;
                }
                Err(e) => log_error!(self.logger, "Error updating {}: {}", name, e),
                Ok(_) => {}
            }
            report.packages.push(PackageReport {
                name: name.to_string(),
                outcome,
            });
        }

        if report.cancelled {
            log_info!(self.logger, "Update check cancelled");
        } else {
            log_info!(self.logger, "Update check finished: {}", report);
        }
        report
    }

    fn deliver_core(&self, manifest: &Manifest, cancel: &CancellationToken) -> CoreOutcome {
        match manifest.core.delivery() {
            CoreDelivery::PatchBundle { url } => {
                let result = self.bundle.download_and_apply(url, cancel);
                match &result {
                    Ok(bundle) if bundle.failed_hunks() > 0 => log_warn!(
                        self.logger,
                        "{} patch hunks did not apply",
                        bundle.failed_hunks()
                    ),
                    Ok(_) => {}
                    Err(e) => log_error!(self.logger, "Error while patching UI: {}", e),
                }
                CoreOutcome::Bundle(result)
            }
            CoreDelivery::LegacyInjection { html_url, line } => {
                let result = self
                    .bundle
                    .inject_legacy(self.manifest_client.as_ref(), html_url, line, cancel)
                    .map(|_| ());
                if let Err(e) = &result {
                    log_error!(self.logger, "Error injecting into root document: {}", e);
                }
                CoreOutcome::Injected(result)
            }
            CoreDelivery::None => {
                log_debug!(self.logger, "Manifest has no UI delivery for the core");
                CoreOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{RecordingHost, StaticRegistry};
    use crate::log::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::manager::{ManagerResult, WriteMode};
    use crate::package::InstalledPackageRecord;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct StaticManifest {
        body: Option<String>,
        fetches: AtomicUsize,
    }

    impl ManifestClient for StaticManifest {
        fn fetch_text(&self, url: &str) -> ManagerResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.body
                .clone()
                .ok_or_else(|| ManagerError::HttpError(format!("HTTP 503 for {}", url)))
        }
    }

    /// Blocks every download until released, then fails it.
    struct BlockingDownloader {
        started: Arc<AtomicBool>,
        release: Arc<AtomicBool>,
    }

    impl BlockingDownloader {
        fn new(release: Arc<AtomicBool>) -> Self {
            Self {
                started: Arc::new(AtomicBool::new(false)),
                release,
            }
        }
    }

    impl PackageDownloader for BlockingDownloader {
        fn download(&self, url: &str, _dest: &Path, _mode: WriteMode) -> ManagerResult<u64> {
            self.started.store(true, Ordering::Release);
            while !self.release.load(Ordering::Acquire) {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: "released".to_string(),
            })
        }
    }

    const MANIFEST: &str = r#"{
        "core": { "name": "ModsGate", "version": "1.0.0", "url": { "*": "https://x/core.zip" } },
        "mods": [
            { "name": "Foo", "version": "2.0.0", "url": { "*": "https://x/$/Foo.zip" } }
        ]
    }"#;

    fn gate(
        temp: &TempDir,
        manifest: Option<&str>,
        downloader: Arc<dyn PackageDownloader>,
        records: Vec<InstalledPackageRecord>,
        host: Arc<RecordingHost>,
        logger: Arc<dyn Logger>,
    ) -> Gate {
        let config = GateConfig::new(
            "https://x/manifest.json",
            temp.path().join("plugins"),
            temp.path().join("ui"),
        );
        let capabilities = HostCapabilities {
            registry: Arc::new(StaticRegistry::new(records)),
            redirector: host.clone(),
            events: host,
        };
        let transport = Transport {
            manifest: Arc::new(StaticManifest {
                body: manifest.map(str::to_string),
                fetches: AtomicUsize::new(0),
            }),
            downloader,
            extractor: Arc::new(ZipExtractor::new()),
        };
        Gate::new(config, capabilities, transport, logger)
    }

    fn released() -> Arc<dyn PackageDownloader> {
        Arc::new(BlockingDownloader::new(Arc::new(AtomicBool::new(true))))
    }

    #[tokio::test]
    async fn test_on_load_reports_errors_without_failing() {
        let temp = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let logger = Arc::new(MemoryLogger::new());
        let gate = gate(
            &temp,
            Some(MANIFEST),
            released(),
            vec![InstalledPackageRecord::new("Foo", "1.5.0")],
            host.clone(),
            logger.clone(),
        );

        let report = gate.on_load().unwrap().wait().await.unwrap();

        assert!(report.manifest_error.is_none());
        assert!(matches!(report.core, Some(CoreOutcome::Skipped)));
        assert_eq!(report.packages.len(), 2);
        assert!(matches!(
            report.packages[0].outcome,
            Ok(crate::manager::PackageUpdateOutcome::NotInstalled)
        ));
        assert!(report.packages[1].outcome.is_err());
        assert!(!report.is_success());
        assert!(logger.contains(LogLevel::Error, "Error updating Foo"));

        let events = host.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, UPDATED_MODS_EVENT);
        assert!(events[0].1.contains("\"Foo\""));
        assert!(!gate.is_updating());
    }

    #[tokio::test]
    async fn test_manifest_failure_recorded() {
        let temp = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let gate = gate(&temp, None, released(), Vec::new(), host.clone(), Arc::new(NoOpLogger));

        let report = gate.on_load().unwrap().wait().await.unwrap();

        assert!(matches!(
            report.manifest_error,
            Some(ManagerError::ManifestFetchFailed { .. })
        ));
        assert!(report.packages.is_empty());
        assert!(host.events().is_empty());
        assert!(report.to_string().starts_with("update check failed"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_load_rejected_while_running() {
        let temp = TempDir::new().unwrap();
        let release = Arc::new(AtomicBool::new(false));
        let downloader = Arc::new(BlockingDownloader::new(release.clone()));
        let gate = gate(
            &temp,
            Some(MANIFEST),
            downloader,
            vec![InstalledPackageRecord::new("Foo", "1.5.0")],
            Arc::new(RecordingHost::new()),
            Arc::new(NoOpLogger),
        );

        let handle = gate.on_load().unwrap();
        assert!(matches!(gate.on_load(), Err(GateError::UpdateInProgress)));

        release.store(true, Ordering::Release);
        handle.wait().await.unwrap();

        let again = gate.on_load().unwrap();
        again.wait().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unload_cancels_and_cleans() {
        let temp = TempDir::new().unwrap();
        let ui = temp.path().join("ui");
        fs::create_dir_all(ui.join("hud")).unwrap();
        fs::write(ui.join("hud/__stale.js"), "old").unwrap();

        let release = Arc::new(AtomicBool::new(false));
        let mut records = vec![InstalledPackageRecord::new("Foo", "1.5.0")];
        records.push(InstalledPackageRecord::new("Bar", "1.0.0"));
        let manifest = r#"{
            "core": {},
            "mods": [
                { "name": "Foo", "version": "2.0.0", "url": { "*": "https://x/Foo.zip" } },
                { "name": "Bar", "version": "2.0.0", "url": { "*": "https://x/Bar.zip" } }
            ]
        }"#;
        let downloader = Arc::new(BlockingDownloader::new(release.clone()));
        let started = downloader.started.clone();
        let gate = gate(
            &temp,
            Some(manifest),
            downloader,
            records,
            Arc::new(RecordingHost::new()),
            Arc::new(NoOpLogger),
        );

        let handle = gate.on_load().unwrap();
        while !started.load(Ordering::Acquire) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let cleanup = gate.on_unload();
        assert!(cleanup.is_clean());
        assert!(handle.is_cancelled());

        release.store(true, Ordering::Release);
        let report = handle.wait().await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.packages[0].name, "Foo");
        assert!(!ui.join("hud/__stale.js").exists());
    }

    #[test]
    fn test_outdated_core_is_not_swapped() {
        let temp = TempDir::new().unwrap();
        let live = temp.path().join("plugins/ModsGate");
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("core.dll"), "core 0.9.0").unwrap();

        let manifest = r#"{
            "core": { "name": "ModsGate", "version": "1.0.0", "url": { "*": "https://x/core.zip" } },
            "mods": []
        }"#;
        let downloader = Arc::new(BlockingDownloader::new(Arc::new(AtomicBool::new(true))));
        let started = downloader.started.clone();
        let gate = gate(
            &temp,
            Some(manifest),
            downloader,
            vec![InstalledPackageRecord::new("ModsGate", "0.9.0")],
            Arc::new(RecordingHost::new()),
            Arc::new(NoOpLogger),
        );

        let report = gate.check_now(&CancellationToken::new()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.packages.len(), 1);
        assert_eq!(
            report.packages[0].outcome.as_ref().unwrap(),
            &crate::manager::PackageUpdateOutcome::Outdated {
                installed: "0.9.0".to_string(),
                available: "1.0.0".to_string(),
            }
        );
        assert!(!started.load(Ordering::Acquire));
        assert_eq!(fs::read_to_string(live.join("core.dll")).unwrap(), "core 0.9.0");
        assert!(!temp.path().join("plugins/ModsGate_v0.9.0.outdated").exists());
        assert_eq!(report.updated().count(), 0);
    }

    #[test]
    fn test_on_load_outside_runtime() {
        let temp = TempDir::new().unwrap();
        let gate = gate(
            &temp,
            Some(MANIFEST),
            released(),
            Vec::new(),
            Arc::new(RecordingHost::new()),
            Arc::new(NoOpLogger),
        );

        assert!(matches!(gate.on_load(), Err(GateError::NoRuntime)));
        assert!(!gate.is_updating());
    }

    #[test]
    fn test_check_now_runs_inline() {
        let temp = TempDir::new().unwrap();
        let gate = gate(
            &temp,
            Some(MANIFEST),
            released(),
            Vec::new(),
            Arc::new(RecordingHost::new()),
            Arc::new(NoOpLogger),
        );

        let report = gate.check_now(&CancellationToken::new()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.packages.len(), 2);
    }
}
