//! Package identity, versions and on-disk naming.
//!
//! # Overview
//!
//! A package is a plugin distributed as an archive (extracted into a
//! directory named after the package) or as a single binary artifact. This
//! module holds the pieces every lifecycle operation shares:
//!
//! - **Version**: dotted-numeric versions with zero-padded comparison
//! - **Platform**: download URL selection from a manifest's platform map
//! - **Naming**: update archives, backup directories, deactivation markers
//! - **Installed**: records reported by the host and derived package states

mod installed;
mod naming;
mod platform;
mod version;

pub use installed::{find_record, InstalledPackageRecord, PackageState};
pub use naming::{
    artifact_filename, backup_dir_name, deactivated_path, parse_backup_dir_name,
    update_archive_filename, BACKUP_SUFFIX, DEACTIVATED_SUFFIX, UPDATE_ARCHIVE_SUFFIX,
};
pub use platform::{expand_url_template, resolve_url, Platform, VERSION_PLACEHOLDER, WILDCARD_KEY};
pub use version::{compare_versions, ModVersion, VersionError};
