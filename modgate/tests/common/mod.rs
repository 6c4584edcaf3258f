//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;

use modgate::manager::{open_destination, ManagerError, ManagerResult, PackageDownloader, WriteMode};
use modgate::manifest::ManifestClient;

/// Build a zip archive in memory from `(name, content)` entries.
pub fn zip_bytes(dir: &Path, entries: &[(&str, &str)]) -> Vec<u8> {
    let path = dir.join("fixture.zip");
    let file = File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::remove_file(&path).unwrap();
    bytes
}

/// Serves fixed bodies per URL and records every request.
#[derive(Default)]
pub struct MockServer {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn body(&self, url: &str) -> ManagerResult<&[u8]> {
        self.requests.lock().push(url.to_string());
        self.bodies
            .get(url)
            .map(Vec::as_slice)
            .ok_or_else(|| ManagerError::HttpError(format!("HTTP 404 Not Found for {}", url)))
    }
}

impl PackageDownloader for MockServer {
    fn download(&self, url: &str, dest: &Path, mode: WriteMode) -> ManagerResult<u64> {
        let body = self.body(url)?;
        let mut file = open_destination(dest, mode)?;
        file.write_all(body).map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        Ok(body.len() as u64)
    }
}

impl ManifestClient for MockServer {
    fn fetch_text(&self, url: &str) -> ManagerResult<String> {
        let body = self.body(url)?;
        Ok(String::from_utf8_lossy(body).into_owned())
    }
}
