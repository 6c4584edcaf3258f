//! Shadow file bookkeeping.
//!
//! The store writes patched content next to the originals and remembers
//! which originals are shadowed, so the root document can be rewritten to
//! reference the shadows and everything can be removed on teardown.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::naming::{resolve_relative, shadow_path, SHADOW_PREFIX};
use crate::log::Logger;
use crate::manager::{ManagerError, ManagerResult};
use crate::{log_debug, log_warn};

/// Ordered set of original relative paths that have a shadow file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowFileSet {
    paths: Vec<String>,
}

impl ShadowFileSet {
    /// Add a path; returns `false` if it was already present.
    pub fn insert(&mut self, relative: &str) -> bool {
        if self.contains(relative) {
            return false;
        }
        self.paths.push(relative.to_string());
        true
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.paths.iter().any(|p| p == relative)
    }

    pub fn remove(&mut self, relative: &str) {
        self.paths.retain(|p| p != relative);
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Result of [`ShadowStore::cleanup`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Shadow files deleted.
    pub removed: Vec<PathBuf>,
    /// Shadow files that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes and tracks shadow files under one base directory.
pub struct ShadowStore {
    base_dir: PathBuf,
    root_document: String,
    files: Mutex<ShadowFileSet>,
    logger: Arc<dyn Logger>,
}

impl ShadowStore {
    /// Create a store.
    ///
    /// `root_document` is the `/`-separated path, relative to `base_dir`, of
    /// the entry document whose references get rewritten. It is never part
    /// of the tracked set.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        root_document: impl Into<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            root_document: root_document.into(),
            files: Mutex::new(ShadowFileSet::default()),
            logger,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn root_document(&self) -> &str {
        &self.root_document
    }

    /// Absolute path of the original root document.
    pub fn root_original_path(&self) -> PathBuf {
        resolve_relative(&self.base_dir, &self.root_document)
    }

    /// Absolute path of the root document's shadow.
    pub fn root_shadow_path(&self) -> PathBuf {
        self.shadow_file(&self.root_document)
    }

    /// Absolute path of the shadow of `relative`.
    pub fn shadow_file(&self, relative: &str) -> PathBuf {
        resolve_relative(&self.base_dir, &shadow_path(relative))
    }

    /// Write `content` as the shadow of `relative` and record it.
    pub fn write(&self, relative: &str, content: &str) -> ManagerResult<PathBuf> {
        let path = self.shadow_file(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&path, content).map_err(|e| ManagerError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        if relative != self.root_document {
            self.files.lock().insert(relative);
        }
        log_debug!(self.logger, "Wrote shadow {}", path.display());
        Ok(path)
    }

    /// Snapshot of the tracked originals, in insertion order.
    pub fn tracked(&self) -> Vec<String> {
        self.files.lock().paths().to_vec()
    }

    pub fn is_tracked(&self, relative: &str) -> bool {
        self.files.lock().contains(relative)
    }

    /// Delete every shadow file under the base directory.
    ///
    /// Shadow files are found by name, so files left behind by an earlier
    /// session are removed too. Entries whose shadow could not be deleted
    /// stay tracked. Running it again on a clean tree changes nothing.
    pub fn cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.base_dir.is_dir() {
            self.remove_shadows_in(&self.base_dir, &mut report);
        }

        let mut files = self.files.lock();
        let still_present: Vec<String> = files
            .paths()
            .iter()
            .filter(|relative| self.shadow_file(relative).exists())
            .cloned()
            .collect();
        *files = ShadowFileSet::default();
        for relative in still_present {
            files.insert(&relative);
        }

        if !report.removed.is_empty() {
            log_debug!(self.logger, "Removed {} shadow files", report.removed.len());
        }
        report
    }

    fn remove_shadows_in(&self, dir: &Path, report: &mut CleanupReport) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log_warn!(self.logger, "Cannot scan {} for shadows: {}", dir.display(), e);
                report.failed.push((dir.to_path_buf(), e.to_string()));
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                self.remove_shadows_in(&path, report);
                continue;
            }
            let is_shadow = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(SHADOW_PREFIX));
            if !is_shadow {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) => {
                    log_warn!(self.logger, "Failed to remove shadow {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }
    }
}
