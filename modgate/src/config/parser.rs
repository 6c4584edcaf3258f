//! Mapping of INI keys onto [`ConfigFile`] fields.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Overlay the values found in `ini` on the defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("manifest")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.is_empty() && !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("manifest", "url", v, "must be an http(s) URL"));
            }
            config.manifest.url = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.manifest.timeout = match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "manifest",
                        "timeout",
                        v,
                        "expected a positive number of seconds",
                    ))
                }
            };
        }
    }

    if let Some(section) = ini.section(Some("paths")) {
        config.paths.plugin_dir = section.get("plugin_dir").and_then(optional_path);
        config.paths.ui_dir = section.get("ui_dir").and_then(optional_path);
    }

    if let Some(section) = ini.section(Some("patches")) {
        if let Some(v) = section.get("root_document") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("patches", "root_document", v, "must not be empty"));
            }
            config.patches.root_document = v.replace('\\', "/");
        }
        if let Some(v) = section.get("staging_dir") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid(
                    "patches",
                    "staging_dir",
                    v,
                    "must be a single directory name",
                ));
            }
            config.patches.staging_dir = v.to_string();
        }
    }

    if let Some(section) = ini.section(Some("packages")) {
        if let Some(v) = section.get("artifact_extension") {
            config.packages.artifact_extension = v.trim().trim_start_matches('.').to_string();
        }
    }

    Ok(config)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| expand_tilde(value))
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
