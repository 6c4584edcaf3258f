//! Per-platform download URL resolution.

use std::collections::HashMap;
use std::fmt;

/// Manifest key that matches every platform.
pub const WILDCARD_KEY: &str = "*";

/// Placeholder in URL templates replaced by the manifest version.
pub const VERSION_PLACEHOLDER: char = '$';

/// Operating systems a manifest can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// The platform this binary was compiled for, if the manifest format
    /// has a key for it.
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Self::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Self::MacOs)
        } else {
            None
        }
    }

    /// Key used for this platform in a manifest URL map.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            Self::Windows => "win",
            Self::Linux => "linux",
            Self::MacOs => "mac",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// Pick the download URL for `platform`.
///
/// The wildcard key is checked first, so a manifest author can force one
/// universal artifact even when platform-specific entries exist.
///
/// ```
/// use std::collections::HashMap;
/// use modgate::package::{resolve_url, Platform};
///
/// let urls = HashMap::from([
///     ("*".to_string(), "A".to_string()),
///     ("win".to_string(), "B".to_string()),
/// ]);
/// assert_eq!(resolve_url(&urls, Some(Platform::Windows)), Some("A"));
/// ```
pub fn resolve_url(urls: &HashMap<String, String>, platform: Option<Platform>) -> Option<&str> {
    if let Some(url) = urls.get(WILDCARD_KEY) {
        return Some(url.as_str());
    }
    platform
        .and_then(|p| urls.get(p.manifest_key()))
        .map(String::as_str)
}

/// Substitute every `$` in a URL template with `version`.
///
/// ```
/// use modgate::package::expand_url_template;
///
/// assert_eq!(
///     expand_url_template("https://x/$/f-$.zip", "2.0.1"),
///     "https://x/2.0.1/f-2.0.1.zip"
/// );
/// ```
pub fn expand_url_template(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}
