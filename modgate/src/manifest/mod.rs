//! Remote manifest: what the core bundle and each mod currently look like.
//!
//! The manifest is fetched fresh on every update check and never cached.

mod client;
mod types;

pub use client::{HttpManifestClient, ManifestClient, DEFAULT_TIMEOUT_SECS, USER_AGENT};
pub use types::{CoreDelivery, CoreDescriptor, Manifest, ManifestEntry, ModDescriptor};
