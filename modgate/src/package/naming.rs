//! On-disk naming protocol for packages.
//!
//! Single source of truth for every name the lifecycle manager puts on disk
//! next to the live package directories:
//! - Update archives (e.g., `Foo_update.zip`)
//! - Backup directories (e.g., `Foo_v1.5.0.outdated`)
//! - Binary artifacts and their deactivation markers (e.g., `Foo.dll.deactivated`)
//!
//! Other tools (and users recovering a failed update by hand) rely on these
//! names, so nothing else should format them directly.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the temporary archive of an in-flight update.
pub const UPDATE_ARCHIVE_SUFFIX: &str = "_update.zip";

/// Suffix of a backup directory created by an update swap.
pub const BACKUP_SUFFIX: &str = ".outdated";

/// Suffix marking a deactivated binary artifact.
pub const DEACTIVATED_SUFFIX: &str = ".deactivated";

/// File name of the temporary archive downloaded during an update.
///
/// # Examples
///
/// ```
/// use modgate::package::update_archive_filename;
///
/// assert_eq!(update_archive_filename("Foo"), "Foo_update.zip");
/// ```
pub fn update_archive_filename(name: &str) -> String {
    format!("{}{}", name, UPDATE_ARCHIVE_SUFFIX)
}

/// Directory name a package is moved to before its replacement is extracted.
///
/// # Format
///
/// `{name}_v{installed_version}.outdated`
///
/// # Examples
///
/// ```
/// use modgate::package::backup_dir_name;
///
/// assert_eq!(backup_dir_name("Foo", "1.5.0"), "Foo_v1.5.0.outdated");
/// ```
pub fn backup_dir_name(name: &str, installed_version: &str) -> String {
    format!("{}_v{}{}", name, installed_version, BACKUP_SUFFIX)
}

/// Split a backup directory name back into package name and version.
///
/// Returns `None` for names that do not follow [`backup_dir_name`].
///
/// ```
/// use modgate::package::parse_backup_dir_name;
///
/// assert_eq!(
///     parse_backup_dir_name("Foo_Bar_v1.5.0.outdated"),
///     Some(("Foo_Bar".to_string(), "1.5.0".to_string()))
/// );
/// assert_eq!(parse_backup_dir_name("Foo"), None);
/// ```
pub fn parse_backup_dir_name(dir_name: &str) -> Option<(String, String)> {
    let stem = dir_name.strip_suffix(BACKUP_SUFFIX)?;
    let split = stem.rfind("_v")?;
    let (name, version) = (&stem[..split], &stem[split + 2..]);
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name.to_string(), version.to_string()))
}

/// File name of a package's binary artifact.
///
/// An empty extension yields the bare package name.
///
/// ```
/// use modgate::package::artifact_filename;
///
/// assert_eq!(artifact_filename("Foo", "dll"), "Foo.dll");
/// assert_eq!(artifact_filename("Foo", ""), "Foo");
/// ```
pub fn artifact_filename(name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

/// Path of the deactivated copy of an artifact.
///
/// ```
/// use std::path::Path;
/// use modgate::package::deactivated_path;
///
/// assert_eq!(
///     deactivated_path(Path::new("/plugins/Foo.dll")),
///     Path::new("/plugins/Foo.dll.deactivated")
/// );
/// ```
pub fn deactivated_path(artifact: &Path) -> PathBuf {
    let mut os: OsString = artifact.as_os_str().to_owned();
    os.push(DEACTIVATED_SUFFIX);
    PathBuf::from(os)
}
