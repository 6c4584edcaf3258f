//! Outcome of one update check.

use std::fmt;

use crate::manager::{BundleReport, ManagerError, ManagerResult, PackageUpdateOutcome};

/// How the core's UI changes were delivered this session.
#[derive(Debug)]
pub enum CoreOutcome {
    /// A patch bundle was downloaded and applied.
    Bundle(ManagerResult<BundleReport>),
    /// A legacy HTML snippet was injected into the root document.
    Injected(ManagerResult<()>),
    /// The manifest carries no UI delivery for the core.
    Skipped,
}

/// Result of the version gate for one manifest entry.
#[derive(Debug)]
pub struct PackageReport {
    pub name: String,
    pub outcome: ManagerResult<PackageUpdateOutcome>,
}

/// Everything an update check did, for hosts that want more than logs.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Set when the manifest could not be fetched or parsed. Nothing else ran.
    pub manifest_error: Option<ManagerError>,
    pub core: Option<CoreOutcome>,
    /// Whether the root document redirect was registered with the host.
    pub redirect_registered: bool,
    pub packages: Vec<PackageReport>,
    /// The flow stopped early at a cancellation checkpoint.
    pub cancelled: bool,
}

impl UpdateReport {
    /// Packages that were swapped for a newer version.
    pub fn updated(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|p| matches!(p.outcome, Ok(PackageUpdateOutcome::Updated { .. })))
    }

    /// Every error recorded during the check.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(e) = &self.manifest_error {
            errors.push(format!("manifest: {}", e));
        }
        match &self.core {
            Some(CoreOutcome::Bundle(Err(e))) => errors.push(format!("patch bundle: {}", e)),
            Some(CoreOutcome::Injected(Err(e))) => errors.push(format!("injection: {}", e)),
            _ => {}
        }
        for package in &self.packages {
            if let Err(e) = &package.outcome {
                errors.push(format!("{}: {}", package.name, e));
            }
        }
        errors
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.errors().is_empty()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(e) = &self.manifest_error {
            return write!(f, "update check failed: {}", e);
        }
        let updated = self.updated().count();
        let failed = self.packages.iter().filter(|p| p.outcome.is_err()).count();
        write!(
            f,
            "{} packages checked, {} updated, {} failed",
            self.packages.len(),
            updated,
            failed
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
