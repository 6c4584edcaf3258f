//! Zip archive extraction.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::read::ZipArchive;

use super::error::{ManagerError, ManagerResult};
use super::traits::ArchiveExtractor;

/// Extracts zip archives with the `zip` crate.
///
/// Entries are written over existing files. Entries whose names would land
/// outside the destination (absolute paths, `..`) abort the extraction.
#[derive(Debug, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }

    /// List file entries of an archive without extracting.
    pub fn list_contents(&self, archive_path: &Path) -> ManagerResult<Vec<String>> {
        let mut archive = open_archive(archive_path)?;
        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| extraction_failed(archive_path, e))?;
            if !entry.is_dir() {
                names.push(entry.name().to_string());
            }
        }
        Ok(names)
    }
}

fn extraction_failed(path: &Path, reason: impl ToString) -> ManagerError {
    ManagerError::ExtractionFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn open_archive(archive_path: &Path) -> ManagerResult<ZipArchive<File>> {
    let file = File::open(archive_path).map_err(|e| ManagerError::ReadFailed {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    ZipArchive::new(file).map_err(|e| extraction_failed(archive_path, e))
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        let mut archive = open_archive(archive_path)?;
        fs::create_dir_all(dest_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let mut extracted = 0;
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| extraction_failed(archive_path, e))?;
            let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
                extraction_failed(
                    archive_path,
                    format!("entry '{}' escapes the destination", entry.name()),
                )
            })?;
            let target = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| ManagerError::CreateDirFailed {
                    path: target.clone(),
                    source: e,
                })?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            let mut out = File::create(&target).map_err(|e| ManagerError::WriteFailed {
                path: target.clone(),
                source: e,
            })?;
            io::copy(&mut entry, &mut out).map_err(|e| ManagerError::WriteFailed {
                path: target.clone(),
                source: e,
            })?;
            extracted += 1;
        }

        Ok(extracted)
    }
}
