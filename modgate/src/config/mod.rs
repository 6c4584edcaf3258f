//! User configuration stored in `~/.modgate/config.ini`.
//!
//! ```ini
//! [manifest]
//! url = https://example.com/mods.json
//! timeout = 30
//!
//! [paths]
//! plugin_dir = ~/Games/MyGame/plugins
//! ui_dir = ~/Games/MyGame/ui
//!
//! [patches]
//! root_document = gateway.html
//! staging_dir = mods
//!
//! [packages]
//! artifact_extension = dll
//! ```
//!
//! A missing file yields defaults. Runtime configs for the engine are built
//! with [`ConfigFile::to_gate_config`].

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, ManifestSettings, PackageSettings, PatchSettings, PathSettings,
    DEFAULT_MANIFEST_TIMEOUT_SECS,
};
