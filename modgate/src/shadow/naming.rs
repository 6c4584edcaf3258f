//! Shadow file naming.
//!
//! A shadow file sits next to its original with `__` prepended to the base
//! name: `ui/hud/main.js` is shadowed by `ui/hud/__main.js`. Relative paths
//! are always `/`-separated so they can be matched against references inside
//! documents regardless of the host platform.

use std::path::{Component, Path, PathBuf};

/// Marker prepended to the base name of every shadow file.
pub const SHADOW_PREFIX: &str = "__";

fn split_basename(relative: &str) -> (&str, &str) {
    match relative.rfind('/') {
        Some(i) => relative.split_at(i + 1),
        None => ("", relative),
    }
}

/// Shadow path of an original relative path.
///
/// ```
/// use modgate::shadow::shadow_path;
///
/// assert_eq!(shadow_path("dir/file.ext"), "dir/__file.ext");
/// assert_eq!(shadow_path("index.html"), "__index.html");
/// ```
pub fn shadow_path(relative: &str) -> String {
    let (dir, name) = split_basename(relative);
    format!("{}{}{}", dir, SHADOW_PREFIX, name)
}

/// Whether the base name of a path carries the shadow marker.
pub fn is_shadow_path(relative: &str) -> bool {
    split_basename(relative).1.starts_with(SHADOW_PREFIX)
}

/// Original relative path of a shadow path.
///
/// ```
/// use modgate::shadow::original_path;
///
/// assert_eq!(original_path("a/__b.js").as_deref(), Some("a/b.js"));
/// assert_eq!(original_path("a/b.js"), None);
/// ```
pub fn original_path(shadow: &str) -> Option<String> {
    let (dir, name) = split_basename(shadow);
    name.strip_prefix(SHADOW_PREFIX)
        .map(|original| format!("{}{}", dir, original))
}

/// `/`-separated form of a relative file system path.
///
/// Returns `None` for absolute paths or paths leaving their root.
pub fn to_relative_string(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Resolve a `/`-separated relative path under `base`.
pub fn resolve_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}
