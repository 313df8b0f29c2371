//! The pinned upstream release that gets built.

use std::path::{Path, PathBuf};

use semver::Version;
use url::Url;

use crate::core::errors::DistError;

/// The RocksDB release every run builds.
///
/// Changing this requires re-checking the fixed CMake parameter set in
/// `builder::toolchain`; option names drift between releases.
pub const ROCKSDB_VERSION: &str = "7.8.3";

const RELEASE_URL_BASE: &str = "https://github.com/facebook/rocksdb/archive";

/// A pinned source archive and where it unpacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedSource {
    pub version: Version,
    pub url: Url,
    /// Expected SHA-256 of the archive, lowercase hex.
    pub sha256: Option<String>,
}

impl PinnedSource {
    /// The default pinned RocksDB release.
    pub fn rocksdb() -> Result<Self, DistError> {
        Self::for_version(ROCKSDB_VERSION)
    }

    /// A GitHub release archive for `version`.
    pub fn for_version(version: &str) -> Result<Self, DistError> {
        let version = Version::parse(version).map_err(|e| DistError::InvalidSource {
            message: format!("bad version `{}`: {}", version, e),
        })?;
        let url = Url::parse(&format!("{}/v{}.tar.gz", RELEASE_URL_BASE, version)).map_err(
            |e| DistError::InvalidSource {
                message: e.to_string(),
            },
        )?;
        Ok(PinnedSource {
            version,
            url,
            sha256: None,
        })
    }

    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256.map(|s| s.to_ascii_lowercase());
        self
    }

    /// File name the archive is saved under in the scratch directory.
    pub fn archive_name(&self) -> String {
        format!("v{}.tar.gz", self.version)
    }

    /// Top-level directory the archive extracts to.
    pub fn source_dir_name(&self) -> String {
        format!("rocksdb-{}", self.version)
    }

    /// Extracted source tree inside `scratch`.
    pub fn source_dir(&self, scratch: &Path) -> PathBuf {
        scratch.join(self.source_dir_name())
    }
}
