//! Post-install pruning and artifact verification.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::errors::DistError;
use crate::core::layout::DestinationLayout;
use crate::util::fs::{find_files_named, remove_dir_all_if_exists};

/// Install subtrees the Go binding never reads.
pub const PRUNED_PATHS: &[&str] = &[
    "bin",
    "share",
    "lib/cmake",
    "lib64/cmake",
    "lib/pkgconfig",
    "lib64/pkgconfig",
];

/// Static library names the installed tree must contain.
pub const STATIC_LIBRARY_NAMES: &[&str] = &["librocksdb.a", "rocksdb.lib"];

/// Remove [`PRUNED_PATHS`] under the destination. Missing paths are skipped.
pub fn prune_install(layout: &DestinationLayout) -> Result<()> {
    for rel in PRUNED_PATHS {
        let path = layout.dest.join(rel);
        if path.exists() {
            tracing::debug!("pruning {}", path.display());
        }
        remove_dir_all_if_exists(&path)?;
    }
    Ok(())
}

/// Find the installed static library under `lib/` or `lib64/`.
pub fn verify_artifacts(layout: &DestinationLayout) -> Result<Vec<PathBuf>, DistError> {
    let libs: Vec<PathBuf> = ["lib", "lib64"]
        .iter()
        .map(|dir| layout.dest.join(dir))
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| find_files_named(&dir, STATIC_LIBRARY_NAMES))
        .collect();

    if libs.is_empty() {
        return Err(DistError::MissingArtifact {
            dest: layout.dest.clone(),
        });
    }

    for lib in &libs {
        tracing::info!("Staged {}", lib.display());
    }
    Ok(libs)
}
