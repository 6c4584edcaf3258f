//! Fetching the manifest and other small text resources.

use std::time::Duration;

use reqwest::blocking::Client;

use super::types::Manifest;
use crate::manager::{ManagerError, ManagerResult};

/// Default HTTP request timeout (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("ModGate/", env!("CARGO_PKG_VERSION"));

/// Source of the manifest.
///
/// Abstracts HTTP so the update flow can be tested without network access.
pub trait ManifestClient: Send + Sync {
    /// Fetch a URL as text.
    fn fetch_text(&self, url: &str) -> ManagerResult<String>;

    /// Fetch and parse the manifest.
    fn fetch_manifest(&self, url: &str) -> ManagerResult<Manifest> {
        let json = self
            .fetch_text(url)
            .map_err(|e| ManagerError::ManifestFetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Manifest::parse(&json, url)
    }
}

/// HTTP-based implementation of [`ManifestClient`].
#[derive(Clone)]
pub struct HttpManifestClient {
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for HttpManifestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpManifestClient")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for HttpManifestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpManifestClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to create HTTP client");

        Self { client, timeout }
    }
}

impl ManifestClient for HttpManifestClient {
    fn fetch_text(&self, url: &str) -> ManagerResult<String> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ManagerError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                ManagerError::HttpError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ManagerError::HttpError(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .map_err(|e| ManagerError::HttpError(e.to_string()))
    }
}
