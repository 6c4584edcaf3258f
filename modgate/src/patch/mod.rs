//! Context-anchored text patches.
//!
//! A patch document is a list of hunks in the diff-match-patch text form:
//!
//! ```text
//! @@ -382,8 +382,46 @@
//!  /div%3E%0A%3C
//! +script src=%22mods/loader.js%22%3E%3C/script%3E%0A%3C
//!  /body%3E
//! ```
//!
//! Each hunk carries its own context, so it can be applied to a base file
//! that has drifted since the patch was authored. Application never fails as
//! a whole: every hunk reports a [`HunkOutcome`] and the caller decides what
//! to do with hunks that could not be placed.

mod apply;
mod diff;
mod document;
mod encoding;
mod make;
mod matcher;

pub use apply::{HunkOutcome, PatchResult, DELETE_THRESHOLD};
pub use diff::{diff_chars, levenshtein, Edit, EditOp};
pub use document::{Hunk, PatchDocument, PatchError};
pub use encoding::{decode_body, encode_body};
pub use make::PATCH_MARGIN;
pub use matcher::{match_main, MATCH_DISTANCE, MATCH_MAX_BITS, MATCH_THRESHOLD};

/// File extension of patch documents in a bundle.
pub const PATCH_EXTENSION: &str = "patch";
