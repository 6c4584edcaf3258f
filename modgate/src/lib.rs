//! ModGate - content updates for game add-on mods
//!
//! This library fetches a remote manifest describing a core UI patch bundle
//! and a list of mods, then brings the local installation up to date:
//! UI assets are patched through shadow files that leave the originals
//! untouched, and plugin packages are swapped for newer versions with a
//! backup of the old one.
//!
//! # High-Level API
//!
//! Hosts drive everything through a [`gate::Gate`]:
//!
//! ```ignore
//! use modgate::gate::{Gate, GateConfig, HostCapabilities, Transport};
//!
//! let gate = Gate::new(config, host, Transport::http(timeout), logger);
//!
//! // Game start
//! let handle = gate.on_load()?;
//!
//! // Game exit
//! handle.cancel();
//! gate.on_unload();
//! ```

pub mod config;
pub mod gate;
pub mod host;
pub mod log;
pub mod logging;
pub mod manager;
pub mod manifest;
pub mod package;
pub mod patch;
pub mod shadow;

/// Version of the ModGate library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
