//! Release archive download and extraction.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::core::errors::DistError;
use crate::core::source::PinnedSource;
use crate::util::fs::{ensure_dir, write_bytes};

/// Downloads archive bytes.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DistError>;
}

/// Blocking HTTP(S) download. No retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DistError> {
        tracing::info!("Fetching {}", url);

        let response =
            reqwest::blocking::get(url).map_err(|e| DistError::fetch(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(DistError::fetch(url, format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .map_err(|e| DistError::fetch(url, format!("failed to read response body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

/// SHA-256 of `data` as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Download the pinned archive into `scratch` and unpack it there.
///
/// Returns the extracted source tree, `<scratch>/rocksdb-<version>`.
pub fn fetch_source(
    fetcher: &dyn Fetch,
    source: &PinnedSource,
    scratch: &Path,
) -> Result<PathBuf> {
    let url = source.url.as_str();
    let data = fetcher.fetch(url)?;

    if let Some(ref expected) = source.sha256 {
        let actual = sha256_hex(&data);
        if &actual != expected {
            return Err(DistError::fetch(
                url,
                format!(
                    "archive hash mismatch:\n  expected: {}\n  actual:   {}",
                    expected, actual
                ),
            )
            .into());
        }
        tracing::debug!("archive hash verified: {}", &actual[..16]);
    }

    let archive = scratch.join(source.archive_name());
    write_bytes(&archive, &data)?;
    tracing::debug!("saved {} bytes to {}", data.len(), archive.display());

    extract_tarball(&data, scratch)
        .with_context(|| format!("failed to extract {}", archive.display()))?;

    let source_dir = source.source_dir(scratch);
    if !source_dir.is_dir() {
        bail!(
            "archive did not contain `{}`",
            source.source_dir_name()
        );
    }

    tracing::info!("Extracted {}", source_dir.display());
    Ok(source_dir)
}

/// Extract a gzip-compressed tarball to a destination directory.
pub fn extract_tarball(data: &[u8], dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use std::io::Cursor;
    use tar::Archive;

    let decoder = GzDecoder::new(Cursor::new(data));
    let mut archive = Archive::new(decoder);

    ensure_dir(dest)?;

    for entry in archive
        .entries()
        .context("failed to read tarball entries")?
    {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry.path().context("failed to get entry path")?.into_owned();

        // `unpack_in` strips leading `/` and skips entries containing `..`
        if !entry
            .unpack_in(dest)
            .with_context(|| format!("failed to extract {}", entry_path.display()))?
        {
            bail!(
                "tarball entry escapes destination directory: {}",
                entry_path.display()
            );
        }
    }

    Ok(())
}
