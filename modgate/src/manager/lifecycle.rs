//! Package Lifecycle Manager.
//!
//! Version-gated updates of package directories plus the four explicit
//! operations on a package's binary artifact:
//!
//! | Operation    | Precondition                                   | Effect                              |
//! |--------------|------------------------------------------------|-------------------------------------|
//! | `install`    | name in manifest                               | download to `{plugins}/{name}.{ext}` |
//! | `uninstall`  | artifact exists                                | delete artifact                     |
//! | `deactivate` | artifact exists, no deactivated copy           | rename to `{artifact}.deactivated`  |
//! | `activate`   | deactivated copy exists, no artifact           | rename back                         |
//!
//! A name must be offered by the manifest or have an artifact on disk,
//! otherwise the operation fails with `ModNotFound`. Unmet preconditions on
//! a known package are reported as [`OperationOutcome::NoOp`].

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::checkpoint;
use super::config::ManagerConfig;
use super::error::{ManagerError, ManagerResult};
use super::traits::{ArchiveExtractor, PackageDownloader, WriteMode};
use super::transaction::SwapTransaction;
use crate::log::Logger;
use crate::manifest::{Manifest, ModDescriptor};
use crate::package::{
    artifact_filename, deactivated_path, update_archive_filename, InstalledPackageRecord,
    PackageState,
};
use crate::{log_debug, log_info, log_warn};

/// Suffix of an artifact download in progress.
const PARTIAL_SUFFIX: &str = ".part";

/// Result of [`PackageLifecycleManager::check_and_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageUpdateOutcome {
    /// The package is not installed locally; nothing was done.
    NotInstalled,
    /// The installed version is current.
    UpToDate { installed: String },
    /// The manifest version is newer but nothing was swapped. Reported for
    /// the core, whose content arrives through the patch bundle.
    Outdated { installed: String, available: String },
    /// The package directory was swapped for the manifest version.
    Updated {
        from: String,
        to: String,
        backup: PathBuf,
        files: usize,
    },
}

impl fmt::Display for PackageUpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => write!(f, "not installed"),
            Self::UpToDate { installed } => write!(f, "up to date (v{})", installed),
            Self::Outdated {
                installed,
                available,
            } => write!(f, "v{} available (v{} installed)", available, installed),
            Self::Updated { from, to, .. } => write!(f, "updated v{} -> v{}", from, to),
        }
    }
}

/// Result of an explicit package operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The operation changed the file system.
    Applied { state: PackageState, path: PathBuf },
    /// Preconditions were not met; nothing changed.
    NoOp { state: PackageState, reason: String },
}

impl OperationOutcome {
    /// State of the package after the operation.
    pub fn state(&self) -> PackageState {
        match self {
            Self::Applied { state, .. } | Self::NoOp { state, .. } => *state,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { state, path } => write!(f, "{} ({})", state, path.display()),
            Self::NoOp { reason, .. } => write!(f, "nothing to do: {}", reason),
        }
    }
}

/// Manages package directories and artifacts under the plugin directory.
pub struct PackageLifecycleManager {
    config: ManagerConfig,
    downloader: Arc<dyn PackageDownloader>,
    extractor: Arc<dyn ArchiveExtractor>,
    logger: Arc<dyn Logger>,
}

impl PackageLifecycleManager {
    pub fn new(
        config: ManagerConfig,
        downloader: Arc<dyn PackageDownloader>,
        extractor: Arc<dyn ArchiveExtractor>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            config,
            downloader,
            extractor,
            logger,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Path of a package's binary artifact.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.config
            .plugin_dir
            .join(artifact_filename(name, &self.config.artifact_extension))
    }

    /// Current on-disk state of a package's artifact.
    pub fn state(&self, name: &str) -> PackageState {
        PackageState::from_artifact(&self.artifact_path(name))
    }

    /// Compare the manifest version against the installed record without
    /// touching the file system.
    ///
    /// Returns `NotInstalled`, `UpToDate` or `Outdated`.
    ///
    /// # Errors
    ///
    /// `MalformedVersion` if either version does not parse.
    pub fn check_version(
        &self,
        descriptor: &ModDescriptor,
        installed: Option<&InstalledPackageRecord>,
    ) -> ManagerResult<PackageUpdateOutcome> {
        let Some(record) = installed else {
            log_debug!(self.logger, "{} is not installed, skipping", descriptor.name);
            return Ok(PackageUpdateOutcome::NotInstalled);
        };

        let remote = descriptor.parsed_version()?;
        let local = record
            .parsed_version()
            .map_err(|source| ManagerError::MalformedVersion {
                package: record.name.clone(),
                source,
            })?;

        if !remote.is_newer_than(&local) {
            log_debug!(self.logger, "{} is up to date", record);
            return Ok(PackageUpdateOutcome::UpToDate {
                installed: record.version.clone(),
            });
        }

        log_info!(
            self.logger,
            "Update available for {}: {} -> {}",
            descriptor.name,
            local,
            remote
        );
        Ok(PackageUpdateOutcome::Outdated {
            installed: record.version.clone(),
            available: descriptor.version.clone(),
        })
    }

    /// Swap the package directory for the manifest version if it is newer.
    ///
    /// # Errors
    ///
    /// `MalformedVersion` if either version does not parse,
    /// `UnsupportedPlatform` if no URL matches, `AlreadyExists` if a stale
    /// update archive is present, plus any transport, extraction or swap
    /// error.
    pub fn check_and_update(
        &self,
        descriptor: &ModDescriptor,
        installed: Option<&InstalledPackageRecord>,
        cancel: &CancellationToken,
    ) -> ManagerResult<PackageUpdateOutcome> {
        checkpoint(cancel)?;
        let record = match (self.check_version(descriptor, installed)?, installed) {
            (PackageUpdateOutcome::Outdated { .. }, Some(record)) => record,
            (outcome, _) => return Ok(outcome),
        };
        let url = descriptor.download_url(self.config.platform)?;

        checkpoint(cancel)?;
        let archive = self
            .config
            .plugin_dir
            .join(update_archive_filename(&descriptor.name));
        self.downloader.download(&url, &archive, WriteMode::CreateNew)?;

        if cancel.is_cancelled() {
            self.remove_archive(&archive);
            return Err(ManagerError::Cancelled);
        }

        let mut swap = SwapTransaction::new(
            &self.config.plugin_dir,
            &descriptor.name,
            &record.version,
            Arc::clone(&self.logger),
        );
        let swapped = swap
            .backup()
            .and_then(|()| swap.install_from(&archive, self.extractor.as_ref()));
        self.remove_archive(&archive);
        let files = swapped?;

        log_info!(
            self.logger,
            "Successfully updated {} to version {}",
            descriptor.name,
            descriptor.version
        );
        Ok(PackageUpdateOutcome::Updated {
            from: record.version.clone(),
            to: descriptor.version.clone(),
            backup: swap.backup_dir().to_path_buf(),
            files,
        })
    }

    fn remove_archive(&self, archive: &Path) {
        match fs::remove_file(archive) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log_warn!(
                self.logger,
                "Failed to remove {}: {}",
                archive.display(),
                e
            ),
        }
    }

    /// Download a package's artifact from the manifest.
    ///
    /// Always rewrites the artifact. The download goes to a partial file
    /// first, so a failed transfer leaves any existing artifact intact.
    pub fn install(
        &self,
        name: &str,
        manifest: &Manifest,
        cancel: &CancellationToken,
    ) -> ManagerResult<OperationOutcome> {
        checkpoint(cancel)?;
        let descriptor = find_descriptor(manifest, name)?;
        let url = descriptor.download_url(self.config.platform)?;

        let artifact = self.artifact_path(name);
        let mut partial = artifact.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        log_info!(self.logger, "Installing {} from {}", name, url);
        let bytes = self.downloader.download(&url, &partial, WriteMode::Truncate)?;

        if cancel.is_cancelled() {
            self.remove_archive(&partial);
            return Err(ManagerError::Cancelled);
        }

        fs::rename(&partial, &artifact).map_err(|e| ManagerError::RenameFailed {
            from: partial.clone(),
            to: artifact.clone(),
            source: e,
        })?;
        log_info!(self.logger, "Installed {} ({} bytes)", name, bytes);

        Ok(OperationOutcome::Applied {
            state: self.state(name),
            path: artifact,
        })
    }

    /// Resolve the artifact path of a package the caller named explicitly.
    fn known_artifact(&self, name: &str, manifest: &Manifest) -> ManagerResult<PathBuf> {
        let artifact = self.artifact_path(name);
        let on_disk = artifact.is_file() || deactivated_path(&artifact).is_file();
        if !name.is_empty() && on_disk {
            return Ok(artifact);
        }
        find_descriptor(manifest, name)?;
        Ok(artifact)
    }

    /// Delete a package's artifact.
    ///
    /// # Errors
    ///
    /// `ModNotFound` if the name is neither in the manifest nor on disk.
    pub fn uninstall(&self, name: &str, manifest: &Manifest) -> ManagerResult<OperationOutcome> {
        let artifact = self.known_artifact(name, manifest)?;
        if !artifact.is_file() {
            return Ok(self.noop(name, "no artifact to delete"));
        }

        fs::remove_file(&artifact).map_err(|e| ManagerError::RemoveFailed {
            path: artifact.clone(),
            source: e,
        })?;
        log_info!(self.logger, "Uninstalled {}", name);

        Ok(OperationOutcome::Applied {
            state: self.state(name),
            path: artifact,
        })
    }

    /// Rename a package's artifact to its deactivated name.
    pub fn deactivate(&self, name: &str, manifest: &Manifest) -> ManagerResult<OperationOutcome> {
        let artifact = self.known_artifact(name, manifest)?;
        let deactivated = deactivated_path(&artifact);

        if !artifact.is_file() {
            return Ok(self.noop(name, "no active artifact"));
        }
        if deactivated.exists() {
            return Ok(self.noop(name, "a deactivated copy already exists"));
        }

        rename(&artifact, &deactivated)?;
        log_info!(self.logger, "Deactivated {}", name);
        Ok(OperationOutcome::Applied {
            state: PackageState::Deactivated,
            path: deactivated,
        })
    }

    /// Rename a deactivated artifact back to its active name.
    pub fn activate(&self, name: &str, manifest: &Manifest) -> ManagerResult<OperationOutcome> {
        let artifact = self.known_artifact(name, manifest)?;
        let deactivated = deactivated_path(&artifact);

        if !deactivated.is_file() {
            return Ok(self.noop(name, "no deactivated artifact"));
        }
        if artifact.exists() {
            return Ok(self.noop(name, "an active artifact already exists"));
        }

        rename(&deactivated, &artifact)?;
        log_info!(self.logger, "Activated {}", name);
        Ok(OperationOutcome::Applied {
            state: PackageState::Activated,
            path: artifact,
        })
    }

    fn noop(&self, name: &str, reason: &str) -> OperationOutcome {
        log_info!(self.logger, "{}: nothing to do, {}", name, reason);
        OperationOutcome::NoOp {
            state: self.state(name),
            reason: reason.to_string(),
        }
    }
}

fn find_descriptor<'m>(manifest: &'m Manifest, name: &str) -> ManagerResult<&'m ModDescriptor> {
    manifest
        .find(name)
        .filter(|_| !name.is_empty())
        .ok_or_else(|| ManagerError::ModNotFound {
            name: name.to_string(),
        })
}

fn rename(from: &Path, to: &Path) -> ManagerResult<()> {
    fs::rename(from, to).map_err(|e| ManagerError::RenameFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::manager::download::open_destination;
    use crate::manager::extractor::test_support::write_zip;
    use crate::manager::ZipExtractor;
    use crate::package::Platform;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    /// Serves fixed bytes per URL and records requests.
    #[derive(Default)]
    struct MockDownloader {
        responses: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockDownloader {
        fn serving(url: &str, body: Vec<u8>) -> Self {
            let mut responses = HashMap::new();
            responses.insert(url.to_string(), body);
            Self {
                responses,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl PackageDownloader for MockDownloader {
        fn download(&self, url: &str, dest: &Path, mode: WriteMode) -> ManagerResult<u64> {
            self.requests.lock().push(url.to_string());
            let body = self
                .responses
                .get(url)
                .ok_or_else(|| ManagerError::HttpError(format!("HTTP 404 for {}", url)))?;
            let mut file = open_destination(dest, mode)?;
            file.write_all(body).unwrap();
            Ok(body.len() as u64)
        }
    }

    fn zip_bytes(temp: &TempDir, entries: &[(&str, &str)]) -> Vec<u8> {
        let path = temp.path().join("fixture.zip");
        write_zip(&path, entries);
        fs::read(path).unwrap()
    }

    fn descriptor(version: &str) -> ModDescriptor {
        let mut url = HashMap::new();
        url.insert("*".to_string(), "https://mods.test/$/Foo.zip".to_string());
        ModDescriptor {
            name: "Foo".to_string(),
            version: version.to_string(),
            url,
            ..Default::default()
        }
    }

    fn manager(plugins: &Path, downloader: MockDownloader, logger: Arc<dyn Logger>) -> PackageLifecycleManager {
        PackageLifecycleManager::new(
            ManagerConfig::new(plugins.to_path_buf()).with_platform(Some(Platform::Linux)),
            Arc::new(downloader),
            Arc::new(ZipExtractor::new()),
            logger,
        )
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let plugins = temp.path().join("plugins");
        fs::create_dir_all(plugins.join("Foo")).unwrap();
        fs::write(plugins.join("Foo/Foo.dll"), "v1.5.0").unwrap();
        (temp, plugins)
    }

    #[test]
    fn test_update_swaps_directory() {
        let (temp, plugins) = setup();
        let body = zip_bytes(&temp, &[("Foo.dll", "v2.0.0"), ("assets/icon.png", "png")]);
        let downloader = MockDownloader::serving("https://mods.test/2.0.0/Foo.zip", body);
        let mgr = manager(&plugins, downloader, Arc::new(NoOpLogger));
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let outcome = mgr
            .check_and_update(&descriptor("2.0.0"), Some(&record), &CancellationToken::new())
            .unwrap();

        match outcome {
            PackageUpdateOutcome::Updated { from, to, backup, files } => {
                assert_eq!(from, "1.5.0");
                assert_eq!(to, "2.0.0");
                assert_eq!(backup, plugins.join("Foo_v1.5.0.outdated"));
                assert_eq!(files, 2);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "v2.0.0");
        assert!(plugins.join("Foo/assets/icon.png").exists());
        assert!(plugins.join("Foo_v1.5.0.outdated/Foo.dll").exists());
        assert!(!plugins.join("Foo_update.zip").exists());
    }

    #[test]
    fn test_not_installed_skipped() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let outcome = mgr
            .check_and_update(&descriptor("2.0.0"), None, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome, PackageUpdateOutcome::NotInstalled);
    }

    #[test]
    fn test_equal_or_older_is_up_to_date() {
        let (_temp, plugins) = setup();
        let downloader = Arc::new(MockDownloader::default());
        let mgr = PackageLifecycleManager::new(
            ManagerConfig::new(plugins.clone()),
            downloader.clone(),
            Arc::new(ZipExtractor::new()),
            Arc::new(NoOpLogger),
        );
        let cancel = CancellationToken::new();

        for remote in ["1.5.0", "1.5", "1.4.9"] {
            let record = InstalledPackageRecord::new("Foo", "1.5.0");
            let outcome = mgr
                .check_and_update(&descriptor(remote), Some(&record), &cancel)
                .unwrap();
            assert_eq!(
                outcome,
                PackageUpdateOutcome::UpToDate {
                    installed: "1.5.0".to_string()
                }
            );
        }
        assert!(downloader.requests.lock().is_empty());
    }

    #[test]
    fn test_malformed_remote_version() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let err = mgr
            .check_and_update(&descriptor("2.0-beta"), Some(&record), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::MalformedVersion { .. }));
    }

    #[test]
    fn test_stale_update_archive_fails_loudly() {
        let (temp, plugins) = setup();
        fs::write(plugins.join("Foo_update.zip"), "stale").unwrap();
        let body = zip_bytes(&temp, &[("Foo.dll", "v2.0.0")]);
        let downloader = MockDownloader::serving("https://mods.test/2.0.0/Foo.zip", body);
        let mgr = manager(&plugins, downloader, Arc::new(NoOpLogger));
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let err = mgr
            .check_and_update(&descriptor("2.0.0"), Some(&record), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::AlreadyExists { .. }));
        assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "v1.5.0");
        assert_eq!(fs::read_to_string(plugins.join("Foo_update.zip")).unwrap(), "stale");
    }

    #[test]
    fn test_corrupt_archive_rolls_back() {
        let (_temp, plugins) = setup();
        let downloader =
            MockDownloader::serving("https://mods.test/2.0.0/Foo.zip", b"not a zip".to_vec());
        let logger = Arc::new(MemoryLogger::new());
        let mgr = manager(&plugins, downloader, logger.clone());
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let err = mgr
            .check_and_update(&descriptor("2.0.0"), Some(&record), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::ExtractionFailed { .. }));
        assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "v1.5.0");
        assert!(!plugins.join("Foo_v1.5.0.outdated").exists());
        assert!(!plugins.join("Foo_update.zip").exists());
        assert!(logger.contains(LogLevel::Info, "Restored Foo"));
    }

    #[test]
    fn test_unsupported_platform() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));
        let mut desc = descriptor("2.0.0");
        desc.url.clear();
        desc.url.insert("win".to_string(), "https://mods.test/win.zip".to_string());
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let err = mgr
            .check_and_update(&desc, Some(&record), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_cancelled_check() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let err = mgr
            .check_and_update(&descriptor("2.0.0"), Some(&record), &cancel)
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    fn manifest_with_foo() -> Manifest {
        Manifest {
            core: Default::default(),
            mods: vec![descriptor("2.0.0")],
        }
    }

    #[test]
    fn test_install_writes_artifact() {
        let (_temp, plugins) = setup();
        let downloader =
            MockDownloader::serving("https://mods.test/2.0.0/Foo.zip", b"binary".to_vec());
        let mgr = manager(&plugins, downloader, Arc::new(NoOpLogger));

        let outcome = mgr
            .install("Foo", &manifest_with_foo(), &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.state(), PackageState::Activated);
        assert_eq!(fs::read(plugins.join("Foo.dll")).unwrap(), b"binary");
        assert!(!plugins.join("Foo.dll.part").exists());

        // Installing again rewrites.
        mgr.install("Foo", &manifest_with_foo(), &CancellationToken::new())
            .unwrap();
        assert_eq!(fs::read(plugins.join("Foo.dll")).unwrap(), b"binary");
    }

    #[test]
    fn test_install_unknown_mod() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let err = mgr
            .install("Bar", &manifest_with_foo(), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::ModNotFound { ref name } if name == "Bar"));
    }

    #[test]
    fn test_install_failure_keeps_existing_artifact() {
        let (_temp, plugins) = setup();
        fs::write(plugins.join("Foo.dll"), "old").unwrap();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let err = mgr
            .install("Foo", &manifest_with_foo(), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, ManagerError::HttpError(_)));
        assert_eq!(fs::read_to_string(plugins.join("Foo.dll")).unwrap(), "old");
    }

    #[test]
    fn test_deactivate_activate_cycle() {
        let (_temp, plugins) = setup();
        fs::write(plugins.join("Foo.dll"), "bin").unwrap();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let manifest = manifest_with_foo();

        let outcome = mgr.deactivate("Foo", &manifest).unwrap();
        assert_eq!(outcome.state(), PackageState::Deactivated);
        assert!(plugins.join("Foo.dll.deactivated").exists());
        assert!(!plugins.join("Foo.dll").exists());

        assert!(mgr.deactivate("Foo", &manifest).unwrap().is_noop());

        let outcome = mgr.activate("Foo", &manifest).unwrap();
        assert_eq!(outcome.state(), PackageState::Activated);
        assert!(plugins.join("Foo.dll").exists());

        assert!(mgr.activate("Foo", &manifest).unwrap().is_noop());
    }

    #[test]
    fn test_deactivate_refuses_to_overwrite() {
        let (_temp, plugins) = setup();
        fs::write(plugins.join("Foo.dll"), "new").unwrap();
        fs::write(plugins.join("Foo.dll.deactivated"), "old").unwrap();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let manifest = manifest_with_foo();

        let outcome = mgr.deactivate("Foo", &manifest).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(
            fs::read_to_string(plugins.join("Foo.dll.deactivated")).unwrap(),
            "old"
        );
        assert!(mgr.activate("Foo", &manifest).unwrap().is_noop());
    }

    #[test]
    fn test_uninstall() {
        let (_temp, plugins) = setup();
        fs::write(plugins.join("Foo.dll"), "bin").unwrap();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let manifest = manifest_with_foo();

        let outcome = mgr.uninstall("Foo", &manifest).unwrap();
        assert_eq!(outcome.state(), PackageState::NotInstalled);
        assert!(!plugins.join("Foo.dll").exists());

        assert!(mgr.uninstall("Foo", &manifest).unwrap().is_noop());
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let (_temp, plugins) = setup();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));
        let manifest = manifest_with_foo();

        for result in [
            mgr.uninstall("Missing", &manifest),
            mgr.activate("Missing", &manifest),
            mgr.deactivate("Missing", &manifest),
            mgr.uninstall("", &manifest),
        ] {
            assert!(matches!(result, Err(ManagerError::ModNotFound { .. })));
        }
    }

    #[test]
    fn test_artifact_on_disk_is_known_without_manifest_entry() {
        let (_temp, plugins) = setup();
        fs::write(plugins.join("Legacy.dll.deactivated"), "bin").unwrap();
        let mgr = manager(&plugins, MockDownloader::default(), Arc::new(NoOpLogger));

        let outcome = mgr.activate("Legacy", &Manifest::default()).unwrap();

        assert_eq!(outcome.state(), PackageState::Activated);
        assert!(plugins.join("Legacy.dll").is_file());
    }

    #[test]
    fn test_check_version_never_downloads() {
        let (_temp, plugins) = setup();
        let downloader = Arc::new(MockDownloader::default());
        let mgr = PackageLifecycleManager::new(
            ManagerConfig::new(plugins.clone()),
            downloader.clone(),
            Arc::new(ZipExtractor::new()),
            Arc::new(NoOpLogger),
        );
        let record = InstalledPackageRecord::new("Foo", "1.5.0");

        let outcome = mgr.check_version(&descriptor("2.0.0"), Some(&record)).unwrap();

        assert_eq!(
            outcome,
            PackageUpdateOutcome::Outdated {
                installed: "1.5.0".to_string(),
                available: "2.0.0".to_string(),
            }
        );
        assert_eq!(outcome.to_string(), "v2.0.0 available (v1.5.0 installed)");
        assert!(downloader.requests.lock().is_empty());
        assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "v1.5.0");
    }

    #[test]
    fn test_outcome_display() {
        let outcome = PackageUpdateOutcome::Updated {
            from: "1.5.0".to_string(),
            to: "2.0.0".to_string(),
            backup: PathBuf::from("Foo_v1.5.0.outdated"),
            files: 1,
        };
        assert_eq!(outcome.to_string(), "updated v1.5.0 -> v2.0.0");
    }
}
