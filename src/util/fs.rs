//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
///
/// A path that is already gone, including one removed between the check
/// and the call, is not an error.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove directory: {}", path.display()))
        }
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write bytes to a file, creating parent directories if needed.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find files under `base` whose file name is one of `names`.
pub fn find_files_named(base: &Path, names: &[&str]) -> Vec<PathBuf> {
    let mut results: Vec<PathBuf> = WalkDir::new(base)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("walk error: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| names.contains(&name))
        })
        .map(|entry| entry.into_path())
        .collect();

    results.sort();
    results
}

/// List every entry under `base`, relative to it, sorted.
pub fn list_tree(base: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    for entry in WalkDir::new(base).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", base.display()))?;
        if let Ok(rel) = entry.path().strip_prefix(base) {
            results.push(rel.to_path_buf());
        }
    }
    results.sort();
    Ok(results)
}
