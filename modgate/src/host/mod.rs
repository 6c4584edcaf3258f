//! Capabilities the host application provides to the engine.
//!
//! The engine never talks to the host directly. It receives these traits at
//! construction, which keeps it testable and lets different hosts (a game's
//! plugin loader, the CLI) plug in their own mechanisms.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::package::InstalledPackageRecord;

/// Event broadcast after the manifest has been resolved.
pub const UPDATED_MODS_EVENT: &str = "UpdatedModsData";

/// The host's list of installed packages.
pub trait PackageRegistry: Send + Sync {
    fn installed_packages(&self) -> Vec<InstalledPackageRecord>;
}

/// Makes the host load a replacement whenever it would load the original.
pub trait PathRedirector: Send + Sync {
    fn register_path_redirect(&self, original: &Path, replacement: &Path);
}

/// Fire-and-forget notifications to the host UI.
pub trait EventSink: Send + Sync {
    fn trigger(&self, event: &str, payload: &str);
}

/// Registry backed by a fixed list.
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    records: Vec<InstalledPackageRecord>,
}

impl StaticRegistry {
    pub fn new(records: Vec<InstalledPackageRecord>) -> Self {
        Self { records }
    }
}

impl PackageRegistry for StaticRegistry {
    fn installed_packages(&self) -> Vec<InstalledPackageRecord> {
        self.records.clone()
    }
}

/// Redirector and event sink that only remember what they were given.
///
/// Used by hosts without an interception facility, and by tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    redirects: Mutex<Vec<(PathBuf, PathBuf)>>,
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<(PathBuf, PathBuf)> {
        self.redirects.lock().clone()
    }

    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().clone()
    }
}

impl PathRedirector for RecordingHost {
    fn register_path_redirect(&self, original: &Path, replacement: &Path) {
        self.redirects
            .lock()
            .push((original.to_path_buf(), replacement.to_path_buf()));
    }
}

impl EventSink for RecordingHost {
    fn trigger(&self, event: &str, payload: &str) {
        self.events
            .lock()
            .push((event.to_string(), payload.to_string()));
    }
}
