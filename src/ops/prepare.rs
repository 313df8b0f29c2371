//! Destination reset before a build.

use anyhow::Result;

use crate::core::layout::DestinationLayout;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

/// Wipe the destination tree and recreate empty `lib/` and `include/`.
///
/// Output from a previous run is never merged with the new one.
pub fn prepare_destination(layout: &DestinationLayout) -> Result<()> {
    tracing::info!("Resetting {}", layout.dest.display());

    remove_dir_all_if_exists(&layout.dest)?;
    ensure_dir(&layout.lib)?;
    ensure_dir(&layout.include)?;

    Ok(())
}
