// src/vault.rs
//! Vault file collection — which notes a batch run will touch.

use crate::error::AppError;
use crate::frontmatter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects the markdown files beneath a folder, sorted by path so a
/// batch run visits them in a stable order.
pub fn collect_markdown_files(folder: &Path, recursive: bool) -> Result<Vec<PathBuf>, AppError> {
    if !folder.is_dir() {
        return Err(AppError::MissingConfiguration(format!(
            "'{}' is not a directory",
            folder.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    log::debug!(
        "Found {} markdown file(s) under {}",
        files.len(),
        folder.display()
    );
    Ok(files)
}

/// Keeps only the files that have never been pushed to the given target,
/// judged by the absence of the namespaced `NotionID-<abName>` key.
///
/// Files that cannot be read or whose front matter fails to parse are
/// kept: the batch driver will attribute the error to them individually.
pub fn filter_unsynced(files: Vec<PathBuf>, ab_name: &str) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| {
            let Ok(raw) = std::fs::read_to_string(path) else {
                return true;
            };
            let Ok((front, _)) = frontmatter::parse(&raw) else {
                return true;
            };
            frontmatter::stored_page_id(&front, ab_name).is_none()
        })
        .collect()
}
