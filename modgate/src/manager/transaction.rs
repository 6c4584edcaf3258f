//! Backup-and-swap of a package directory during an update.
//!
//! The transaction moves the live directory aside, extracts the new version
//! into its place and, if extraction fails, puts the old version back:
//!
//! ```text
//! Pending ──backup()──▶ BackedUp ──install_from() ok──▶ Committed
//!                          │
//!                          └── extraction error ──▶ RolledBack | PackageLost
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ManagerError, ManagerResult};
use super::traits::ArchiveExtractor;
use crate::log::Logger;
use crate::package::backup_dir_name;
use crate::{log_error, log_info, log_warn};

/// Progress of a [`SwapTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    /// Nothing has been touched.
    Pending,
    /// The live directory was moved to the backup path (or did not exist).
    BackedUp,
    /// The new version is in place.
    Committed,
    /// Extraction failed and the previous version was restored.
    RolledBack,
}

/// Swap of `{plugins}/{name}` for a freshly extracted version.
pub struct SwapTransaction {
    name: String,
    live: PathBuf,
    backup: PathBuf,
    had_live: bool,
    state: SwapState,
    logger: Arc<dyn Logger>,
}

impl SwapTransaction {
    pub fn new(
        plugin_dir: &Path,
        name: &str,
        installed_version: &str,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.to_string(),
            live: plugin_dir.join(name),
            backup: plugin_dir.join(backup_dir_name(name, installed_version)),
            had_live: false,
            state: SwapState::Pending,
            logger,
        }
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub fn live_dir(&self) -> &Path {
        &self.live
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup
    }

    /// Move the live directory to the backup path.
    ///
    /// Fails with `AlreadyExists` if a backup for this version is already
    /// present. A missing live directory is not an error; there is simply
    /// nothing to restore later.
    pub fn backup(&mut self) -> ManagerResult<()> {
        debug_assert_eq!(self.state, SwapState::Pending);

        if self.backup.exists() {
            return Err(ManagerError::AlreadyExists {
                path: self.backup.clone(),
            });
        }

        if self.live.exists() {
            fs::rename(&self.live, &self.backup).map_err(|e| ManagerError::RenameFailed {
                from: self.live.clone(),
                to: self.backup.clone(),
                source: e,
            })?;
            self.had_live = true;
            log_info!(
                self.logger,
                "Backed up {} to {}",
                self.name,
                self.backup.display()
            );
        } else {
            log_warn!(
                self.logger,
                "{} has no package directory at {}, nothing to back up",
                self.name,
                self.live.display()
            );
        }

        self.state = SwapState::BackedUp;
        Ok(())
    }

    /// Extract `archive` into the live directory, rolling back on failure.
    ///
    /// The returned error is the extraction error when the rollback
    /// succeeded, or `PackageLost` when it did not.
    pub fn install_from(
        &mut self,
        archive: &Path,
        extractor: &dyn ArchiveExtractor,
    ) -> ManagerResult<usize> {
        debug_assert_eq!(self.state, SwapState::BackedUp);

        match extractor.extract(archive, &self.live) {
            Ok(count) => {
                self.state = SwapState::Committed;
                Ok(count)
            }
            Err(cause) => Err(self.rollback(cause)),
        }
    }

    fn rollback(&mut self, cause: ManagerError) -> ManagerError {
        log_warn!(self.logger, "Extraction of {} failed: {}; rolling back", self.name, cause);

        if self.live.exists() {
            if let Err(e) = fs::remove_dir_all(&self.live) {
                return self.lost(format!(
                    "could not remove partial {}: {}",
                    self.live.display(),
                    e
                ));
            }
        }

        if self.had_live {
            if let Err(e) = fs::rename(&self.backup, &self.live) {
                return self.lost(format!("could not restore backup: {}", e));
            }
            log_info!(self.logger, "Restored {} from backup", self.name);
        }

        self.state = SwapState::RolledBack;
        cause
    }

    fn lost(&self, reason: String) -> ManagerError {
        log_error!(
            self.logger,
            "{} is lost, manual recovery from {} required: {}",
            self.name,
            self.backup.display(),
            reason
        );
        ManagerError::PackageLost {
            name: self.name.clone(),
            backup: self.backup.clone(),
            reason,
        }
    }
}
