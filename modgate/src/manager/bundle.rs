//! Patch Bundle Installer.
//!
//! Downloads the core's patch bundle, applies every patch document in it to
//! the UI assets as shadow files, and points the root document's shadow at
//! the other shadows.
//!
//! # Layout
//!
//! ```text
//! {base}/Patches.zip            downloaded archive (deleted after extraction)
//! {base}/mods/hud/main.js.patch staged patch document
//! {base}/hud/main.js            original, never modified
//! {base}/hud/__main.js          shadow written from the patched content
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::BundleConfig;
use super::error::{ManagerError, ManagerResult};
use super::traits::{ArchiveExtractor, PackageDownloader, WriteMode};
use super::checkpoint;
use crate::log::Logger;
use crate::manifest::ManifestClient;
use crate::patch::{HunkOutcome, PatchDocument, PATCH_EXTENSION};
use crate::shadow::{
    resolve_relative, rewrite_references, to_relative_string, CleanupReport, ShadowStore,
};
use crate::{log_debug, log_info, log_warn};

/// Outcome of applying one patch document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// `/`-separated target path relative to the base directory.
    pub target: String,
    /// Whether the original was absent and patched from empty content.
    pub base_missing: bool,
    pub outcomes: Vec<HunkOutcome>,
}

impl DocumentReport {
    pub fn failed_hunks(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_applied()).count()
    }
}

/// Outcome of [`PatchBundleInstaller::download_and_apply`].
#[derive(Debug, Clone, Default)]
pub struct BundleReport {
    pub archive_bytes: u64,
    pub extracted_files: usize,
    pub documents: Vec<DocumentReport>,
    /// References rewritten in the root shadow, if it exists.
    pub root_replacements: Option<usize>,
}

impl BundleReport {
    pub fn failed_hunks(&self) -> usize {
        self.documents.iter().map(DocumentReport::failed_hunks).sum()
    }
}

/// Applies patch bundles as shadow files.
pub struct PatchBundleInstaller {
    config: BundleConfig,
    downloader: Arc<dyn PackageDownloader>,
    extractor: Arc<dyn ArchiveExtractor>,
    store: ShadowStore,
    logger: Arc<dyn Logger>,
}

impl PatchBundleInstaller {
    pub fn new(
        config: BundleConfig,
        downloader: Arc<dyn PackageDownloader>,
        extractor: Arc<dyn ArchiveExtractor>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let store = ShadowStore::new(
            config.base_dir.clone(),
            config.root_document.clone(),
            Arc::clone(&logger),
        );
        Self {
            config,
            downloader,
            extractor,
            store,
            logger,
        }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn store(&self) -> &ShadowStore {
        &self.store
    }

    /// Download, extract and apply a bundle, then rewrite the root shadow.
    pub fn download_and_apply(
        &self,
        bundle_url: &str,
        cancel: &CancellationToken,
    ) -> ManagerResult<BundleReport> {
        checkpoint(cancel)?;
        let archive = self.config.archive_path();
        log_info!(self.logger, "Downloading patch bundle {}", bundle_url);
        let archive_bytes = self
            .downloader
            .download(bundle_url, &archive, WriteMode::Truncate)?;

        checkpoint(cancel)?;
        let staging = self.config.staging_dir();
        let extracted_files = self.extractor.extract(&archive, &staging)?;
        fs::remove_file(&archive).map_err(|e| ManagerError::RemoveFailed {
            path: archive.clone(),
            source: e,
        })?;
        log_debug!(
            self.logger,
            "Extracted {} files to {}",
            extracted_files,
            staging.display()
        );

        let mut report = self.apply_staged(cancel)?;
        report.archive_bytes = archive_bytes;
        report.extracted_files = extracted_files;
        Ok(report)
    }

    /// Apply every patch document in the staging directory.
    pub fn apply_staged(&self, cancel: &CancellationToken) -> ManagerResult<BundleReport> {
        let staging = self.config.staging_dir();
        let mut report = BundleReport::default();

        for patch_file in find_patch_documents(&staging)? {
            checkpoint(cancel)?;
            report.documents.push(self.apply_document(&staging, &patch_file)?);
        }

        checkpoint(cancel)?;
        report.root_replacements = self.rewrite_root()?;
        Ok(report)
    }

    fn apply_document(&self, staging: &Path, patch_file: &Path) -> ManagerResult<DocumentReport> {
        let target = patch_target(staging, patch_file)?;
        let text = fs::read_to_string(patch_file).map_err(|e| ManagerError::ReadFailed {
            path: patch_file.to_path_buf(),
            source: e,
        })?;
        let document = PatchDocument::parse(&text).map_err(|source| ManagerError::MalformedPatch {
            path: patch_file.to_path_buf(),
            source,
        })?;

        let original = resolve_relative(&self.config.base_dir, &target);
        let (base, base_missing) = read_or_empty(&original)?;
        if base_missing {
            log_debug!(self.logger, "{} does not exist, patching empty content", target);
        }

        let result = document.apply(&base);
        for (index, outcome) in result.outcomes.iter().enumerate() {
            match outcome {
                HunkOutcome::NotFound => {
                    log_warn!(self.logger, "{}: hunk {} did not apply", target, index + 1)
                }
                HunkOutcome::Fuzzy { offset } => {
                    log_debug!(self.logger, "{}: hunk {} applied fuzzily at offset {}", target, index + 1, offset)
                }
                _ => {}
            }
        }

        self.store.write(&target, &result.content)?;
        log_info!(
            self.logger,
            "Patched {} ({}/{} hunks)",
            target,
            result.applied_count(),
            result.outcomes.len()
        );

        Ok(DocumentReport {
            target,
            base_missing,
            outcomes: result.outcomes,
        })
    }

    /// Rewrite references in the root shadow to the tracked shadows.
    ///
    /// Returns `None` when no root shadow exists.
    pub fn rewrite_root(&self) -> ManagerResult<Option<usize>> {
        let root_shadow = self.store.root_shadow_path();
        if !root_shadow.is_file() {
            log_debug!(self.logger, "No root shadow at {}, skipping rewrite", root_shadow.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&root_shadow).map_err(|e| ManagerError::ReadFailed {
            path: root_shadow.clone(),
            source: e,
        })?;
        let outcome = rewrite_references(&content, &self.store.tracked());
        self.store.write(self.store.root_document(), &outcome.content)?;
        log_info!(
            self.logger,
            "Rewrote {} references in {}",
            outcome.replacements,
            root_shadow.display()
        );
        Ok(Some(outcome.replacements))
    }

    /// Write the root shadow as the original with an HTML snippet inserted
    /// before `line` (0-based).
    pub fn inject_legacy(
        &self,
        client: &dyn ManifestClient,
        html_url: &str,
        line: usize,
        cancel: &CancellationToken,
    ) -> ManagerResult<PathBuf> {
        checkpoint(cancel)?;
        let snippet = client.fetch_text(html_url)?;

        checkpoint(cancel)?;
        let original = self.store.root_original_path();
        let content = fs::read_to_string(&original).map_err(|e| ManagerError::ReadFailed {
            path: original.clone(),
            source: e,
        })?;

        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        if line > lines.len() {
            log_warn!(
                self.logger,
                "Injection line {} is past the end of {} ({} lines), appending",
                line,
                original.display(),
                lines.len()
            );
        }
        let at = line.min(lines.len());
        let mut injected = String::with_capacity(content.len() + snippet.len() + 1);
        for existing in &lines[..at] {
            injected.push_str(existing);
        }
        if at > 0 && !injected.ends_with('\n') {
            injected.push('\n');
        }
        injected.push_str(snippet.trim_end_matches(['\r', '\n']));
        injected.push('\n');
        for existing in &lines[at..] {
            injected.push_str(existing);
        }

        let path = self.store.write(self.store.root_document(), &injected)?;
        log_info!(self.logger, "Injected {} into {}", html_url, path.display());
        Ok(path)
    }

    /// Delete every shadow file under the base directory.
    pub fn cleanup(&self) -> CleanupReport {
        self.store.cleanup()
    }
}

fn read_or_empty(path: &Path) -> ManagerResult<(String, bool)> {
    match fs::read_to_string(path) {
        Ok(content) => Ok((content, false)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((String::new(), true)),
        Err(e) => Err(ManagerError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// `/`-separated target of a staged patch file: its path relative to the
/// staging directory without the patch extension.
fn patch_target(staging: &Path, patch_file: &Path) -> ManagerResult<String> {
    let relative = patch_file
        .strip_prefix(staging)
        .ok()
        .and_then(to_relative_string)
        .ok_or_else(|| ManagerError::InvalidPath(patch_file.display().to_string()))?;
    let suffix = format!(".{}", PATCH_EXTENSION);
    Ok(relative
        .strip_suffix(&suffix)
        .unwrap_or(&relative)
        .to_string())
}

/// All patch documents under `dir`, depth-first in name order.
pub fn find_patch_documents(dir: &Path) -> ManagerResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    if dir.is_dir() {
        collect_patch_documents(dir, &mut found)?;
    }
    Ok(found)
}

fn collect_patch_documents(dir: &Path, found: &mut Vec<PathBuf>) -> ManagerResult<()> {
    let read_failed = |e| ManagerError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_failed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ManagerError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;
        if file_type.is_dir() {
            collect_patch_documents(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == PATCH_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}
