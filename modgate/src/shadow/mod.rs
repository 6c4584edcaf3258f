//! Non-destructive patch output.
//!
//! Patched assets are never written over their originals. Each one gets a
//! shadow file (`__` + base name) next to the original, the root document's
//! shadow is rewritten to reference the shadows, and the host is told to
//! serve the root shadow in place of the root document. Teardown deletes
//! every shadow and the installation is back to stock.

mod naming;
mod rewrite;
mod store;

pub use naming::{
    is_shadow_path, original_path, resolve_relative, shadow_path, to_relative_string,
    SHADOW_PREFIX,
};
pub use rewrite::{rewrite_references, RewriteOutcome};
pub use store::{CleanupReport, ShadowFileSet, ShadowStore};
