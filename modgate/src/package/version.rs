//! Dotted-numeric version comparison.
//!
//! Mod versions in the manifest and in the host's registry are plain dotted
//! numbers of any length (`"1.2"`, `"1.2.10"`, `"2024.3.1.7"`). They are not
//! semver: a missing trailing segment counts as zero, so `"1.2" == "1.2.0"`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The version string was empty.
    #[error("empty version string")]
    Empty,

    /// A segment was not a non-negative integer.
    #[error("malformed version '{version}': segment '{segment}' is not numeric")]
    MalformedVersion { version: String, segment: String },
}

/// A parsed dotted-numeric version.
///
/// Equality and ordering ignore trailing zero segments. The original text is
/// kept for display, since on-disk names (backup directories) must reproduce
/// the version exactly as the registry reported it.
#[derive(Debug, Clone)]
pub struct ModVersion {
    raw: String,
    segments: Vec<u64>,
}

impl ModVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// [`VersionError::MalformedVersion`] if any segment is empty or
    /// non-numeric.
    ///
    /// ```
    /// use modgate::package::ModVersion;
    ///
    /// let v = ModVersion::parse("1.2.10").unwrap();
    /// assert_eq!(v.segments(), &[1, 2, 10]);
    /// assert!(ModVersion::parse("1.x").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let segments = trimmed
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::MalformedVersion {
                        version: trimmed.to_string(),
                        segment: segment.to_string(),
                    });
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionError::MalformedVersion {
                        version: trimmed.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Numeric segments as written.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The version text as it was parsed (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `self` should replace `installed`. Equal versions are never
    /// reinstalled.
    pub fn is_newer_than(&self, installed: &ModVersion) -> bool {
        self > installed
    }
}

impl Ord for ModVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ModVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ModVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModVersion {}

impl FromStr for ModVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two version strings.
///
/// ```
/// use std::cmp::Ordering;
/// use modgate::package::compare_versions;
///
/// assert_eq!(compare_versions("1.10.0", "1.9.9").unwrap(), Ordering::Greater);
/// assert_eq!(compare_versions("1.2", "1.2.0").unwrap(), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a = ModVersion::parse(a)?;
    let b = ModVersion::parse(b)?;
    Ok(a.cmp(&b))
}
