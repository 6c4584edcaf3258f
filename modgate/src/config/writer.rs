//! Serialization of [`ConfigFile`] to a commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let plugin_dir = config
        .paths
        .plugin_dir
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();
    let ui_dir = config
        .paths
        .ui_dir
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();

    format!(
        r#"[manifest]
; URL of the mods manifest (JSON)
url = {}
; HTTP timeout in seconds
timeout = {}

[paths]
; Directory holding package directories and binaries
plugin_dir = {}
; UI asset directory patched through shadow files
ui_dir = {}

[patches]
; Entry document whose references are redirected to shadow files
root_document = {}
; Directory under ui_dir where patch bundles are extracted
staging_dir = {}

[packages]
; Extension of package binaries (without the dot)
artifact_extension = {}
"#,
        config.manifest.url,
        config.manifest.timeout,
        plugin_dir,
        ui_dir,
        config.patches.root_document,
        config.patches.staging_dir,
        config.packages.artifact_extension,
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
