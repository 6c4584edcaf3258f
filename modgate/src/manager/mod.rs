//! Package management and patch bundle installation.
//!
//! - [`PatchBundleInstaller`]: UI patch bundles applied as shadow files
//! - [`PackageLifecycleManager`]: version-gated package swaps and the
//!   install/uninstall/activate/deactivate operations
//!
//! Transport and archive handling sit behind the [`PackageDownloader`] and
//! [`ArchiveExtractor`] traits so both can be replaced in tests.

mod bundle;
mod config;
pub(crate) mod download;
mod error;
pub(crate) mod extractor;
mod lifecycle;
mod traits;
mod transaction;

pub use bundle::{find_patch_documents, BundleReport, DocumentReport, PatchBundleInstaller};
pub use config::{
    BundleConfig, ManagerConfig, DEFAULT_ARTIFACT_EXTENSION, DEFAULT_BUNDLE_ARCHIVE,
    DEFAULT_ROOT_DOCUMENT, DEFAULT_STAGING_DIR,
};
pub use download::{open_destination, HttpDownloader};
pub use error::{ManagerError, ManagerResult};
pub use extractor::ZipExtractor;
pub use lifecycle::{OperationOutcome, PackageLifecycleManager, PackageUpdateOutcome};
pub use traits::{ArchiveExtractor, PackageDownloader, WriteMode};
pub use transaction::{SwapState, SwapTransaction};

use tokio_util::sync::CancellationToken;

/// Fail with `Cancelled` once `cancel` has fired.
pub(crate) fn checkpoint(cancel: &CancellationToken) -> ManagerResult<()> {
    if cancel.is_cancelled() {
        Err(ManagerError::Cancelled)
    } else {
        Ok(())
    }
}
