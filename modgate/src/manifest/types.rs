//! Manifest data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::manager::{ManagerError, ManagerResult};
use crate::package::{expand_url_template, resolve_url, ModVersion, Platform};

/// An optional mod offered by the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModDescriptor {
    /// Unique key, matched against installed package names.
    pub name: String,
    pub guid: String,
    pub author: String,
    pub icon_url: String,
    /// Platform key (`*`, `win`, `linux`, `mac`) to URL template.
    #[serde(alias = "urls")]
    pub url: HashMap<String, String>,
    pub version: String,
    pub game_version: String,
    pub description: String,
}

impl ModDescriptor {
    pub fn parsed_version(&self) -> ManagerResult<ModVersion> {
        ModVersion::parse(&self.version).map_err(|source| ManagerError::MalformedVersion {
            package: self.name.clone(),
            source,
        })
    }

    /// Download URL for `platform`, with the version substituted.
    pub fn download_url(&self, platform: Option<Platform>) -> ManagerResult<String> {
        let template =
            resolve_url(&self.url, platform).ok_or_else(|| ManagerError::UnsupportedPlatform {
                name: self.name.clone(),
                platform: platform.map_or_else(|| "unknown".to_string(), |p| p.to_string()),
            })?;
        Ok(expand_url_template(template, &self.version))
    }
}

/// The core entry: identity of the engine's own package plus how UI
/// patches are delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreDescriptor {
    #[serde(flatten)]
    pub identity: ModDescriptor,

    /// URL of the zip archive holding `*.patch` documents.
    #[serde(alias = "ui_patches", skip_serializing_if = "Option::is_none")]
    pub patch_bundle_url: Option<String>,

    /// URL of an HTML snippet for the legacy injection path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_html: Option<String>,

    /// 0-based line of the root document the snippet is inserted before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_line: Option<usize>,

    // Carried through untouched.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub dependencies: Value,
    #[serde(alias = "dependencies_versions", skip_serializing_if = "Value::is_null")]
    pub dependency_versions: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub installers: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub signatures: Value,
}

/// How the core entry delivers its UI changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreDelivery<'a> {
    PatchBundle { url: &'a str },
    LegacyInjection { html_url: &'a str, line: usize },
    None,
}

impl CoreDescriptor {
    /// The bundle wins when both delivery forms are present.
    pub fn delivery(&self) -> CoreDelivery<'_> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.trim().is_empty())
        }

        if let Some(url) = non_empty(&self.patch_bundle_url) {
            return CoreDelivery::PatchBundle { url };
        }
        match (non_empty(&self.inject_html), self.inject_line) {
            (Some(html_url), Some(line)) => CoreDelivery::LegacyInjection { html_url, line },
            _ => CoreDelivery::None,
        }
    }
}

/// One manifest entry, versioned like a package but delivered by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry<'a> {
    CorePatchBundle(&'a CoreDescriptor),
    InstallablePackage(&'a ModDescriptor),
}

impl<'a> ManifestEntry<'a> {
    pub fn descriptor(&self) -> &'a ModDescriptor {
        match *self {
            Self::CorePatchBundle(core) => &core.identity,
            Self::InstallablePackage(descriptor) => descriptor,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.descriptor().name
    }

    pub fn version(&self) -> &'a str {
        &self.descriptor().version
    }

    pub fn is_core(&self) -> bool {
        matches!(self, Self::CorePatchBundle(_))
    }
}

/// The parsed remote manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub core: CoreDescriptor,
    pub mods: Vec<ModDescriptor>,
}

impl Manifest {
    /// Parse manifest JSON fetched from `url`.
    pub fn parse(json: &str, url: &str) -> ManagerResult<Self> {
        serde_json::from_str(json).map_err(|e| ManagerError::ManifestParseFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// The core entry followed by every mod, in manifest order.
    pub fn entries(&self) -> Vec<ManifestEntry<'_>> {
        std::iter::once(ManifestEntry::CorePatchBundle(&self.core))
            .chain(self.mods.iter().map(ManifestEntry::InstallablePackage))
            .collect()
    }

    /// Find a descriptor by name, the core included.
    pub fn find(&self, name: &str) -> Option<&ModDescriptor> {
        self.entries()
            .into_iter()
            .map(|entry| entry.descriptor())
            .find(|descriptor| descriptor.name == name)
    }

    /// JSON form of the mods, as broadcast to the host UI.
    pub fn mods_json(&self) -> String {
        serde_json::to_string(&self.mods).unwrap_or_else(|_| "[]".to_string())
    }
}
