//! HTTP downloads of archives and artifacts.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use super::error::{ManagerError, ManagerResult};
use super::traits::{PackageDownloader, WriteMode};
use crate::manifest::USER_AGENT;

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// HTTP-based downloader.
///
/// Streams the response body to disk. A file this downloader created is
/// removed again if the transfer fails, so an interrupted download never
/// masquerades as a complete one.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDownloader {
    /// Create a new HTTP downloader with default settings.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP downloader with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, timeout }
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> ManagerError {
        if e.is_timeout() {
            ManagerError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    fn stream(&self, url: &str, mut response: impl Read, file: File, dest: &Path) -> ManagerResult<u64> {
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| ManagerError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("Read error: {}", e),
                })?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| ManagerError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;
        }

        writer.flush().map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }
}

/// Open `dest` for writing according to `mode`, creating parent directories.
pub fn open_destination(dest: &Path, mode: WriteMode) -> ManagerResult<File> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    match mode {
        WriteMode::CreateNew => options.create_new(true),
        WriteMode::Truncate => options.create(true).truncate(true),
    };

    options.open(dest).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            ManagerError::AlreadyExists {
                path: dest.to_path_buf(),
            }
        } else {
            ManagerError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            }
        }
    })
}

impl PackageDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path, mode: WriteMode) -> ManagerResult<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        let file = open_destination(dest, mode)?;
        self.stream(url, response, file, dest).map_err(|e| {
            let _ = fs::remove_file(dest);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_downloader_creation() {
        let downloader = HttpDownloader::new();
        assert_eq!(downloader.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_downloader_with_timeout() {
        let downloader = HttpDownloader::with_timeout(Duration::from_secs(60));
        assert_eq!(downloader.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_open_destination_create_new_conflict() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("Foo_update.zip");
        fs::write(&dest, b"stale").unwrap();

        let result = open_destination(&dest, WriteMode::CreateNew);
        assert!(matches!(result, Err(ManagerError::AlreadyExists { .. })));
        assert_eq!(fs::read(&dest).unwrap(), b"stale");
    }

    #[test]
    fn test_open_destination_truncate() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("Patches.zip");
        fs::write(&dest, b"stale content").unwrap();

        drop(open_destination(&dest, WriteMode::Truncate).unwrap());
        assert_eq!(fs::metadata(&dest).unwrap().len(), 0);
    }

    #[test]
    fn test_open_destination_creates_parents() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a").join("b").join("f.zip");
        assert!(open_destination(&dest, WriteMode::CreateNew).is_ok());
        assert!(dest.exists());
    }

    #[test]
    fn test_stream_writes_everything() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.bin");
        let body = vec![7u8; BUFFER_SIZE * 2 + 13];
        let file = open_destination(&dest, WriteMode::CreateNew).unwrap();

        let written = HttpDownloader::new()
            .stream("test://x", body.as_slice(), file, &dest)
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }
}
