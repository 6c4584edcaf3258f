//! Installed package records and lifecycle states.
//!
//! The host's package registry reports what is installed as a list of
//! [`InstalledPackageRecord`]s. The engine never writes to that registry; it
//! only reads the records to decide whether an update is due.

use std::fmt;
use std::path::Path;

use super::naming::deactivated_path;
use super::version::{ModVersion, VersionError};

/// A package the host reports as installed.
///
/// # Example
///
/// ```
/// use modgate::package::InstalledPackageRecord;
///
/// let record = InstalledPackageRecord::new("Foo", "1.5.0");
/// assert_eq!(record.name, "Foo");
/// assert_eq!(record.parsed_version().unwrap().segments(), &[1, 5, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstalledPackageRecord {
    /// Package name, matching a manifest descriptor's `name`.
    pub name: String,

    /// Installed version as reported by the host.
    pub version: String,
}

impl InstalledPackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse the reported version.
    pub fn parsed_version(&self) -> Result<ModVersion, VersionError> {
        ModVersion::parse(&self.version)
    }
}

impl fmt::Display for InstalledPackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Find a record by package name.
pub fn find_record<'a>(
    records: &'a [InstalledPackageRecord],
    name: &str,
) -> Option<&'a InstalledPackageRecord> {
    records.iter().find(|r| r.name == name)
}

/// Lifecycle state of a package on disk.
///
/// ```text
/// NotInstalled ──install──▶ Activated ◀──activate── Deactivated
///                               │                        ▲
///                               └───────deactivate───────┘
/// ```
///
/// `Updating` is transient and only observed while a swap is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageState {
    NotInstalled,
    Activated,
    Deactivated,
    Updating,
}

impl PackageState {
    /// Derive the state from the artifact and its deactivation marker.
    ///
    /// An active artifact wins when both are present.
    pub fn from_artifact(artifact: &Path) -> Self {
        if artifact.is_file() {
            Self::Activated
        } else if deactivated_path(artifact).is_file() {
            Self::Deactivated
        } else {
            Self::NotInstalled
        }
    }

    /// Whether a binary artifact exists in either form.
    pub fn is_installed(&self) -> bool {
        !matches!(self, Self::NotInstalled)
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotInstalled => "not installed",
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::Updating => "updating",
        };
        write!(f, "{}", s)
    }
}
