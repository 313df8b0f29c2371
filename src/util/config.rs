//! Configuration file support for rockbuild.
//!
//! An optional project config lives at `.rockbuild/config.toml` under the
//! project root. It only feeds plumbing values (parallelism, scratch space,
//! MSVC install paths, archive checksum); the platform policy table and the
//! fixed CMake parameter set are not configurable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default `make` parallelism.
pub const DEFAULT_JOBS: usize = 16;

const MSVC_TOOLS: &str =
    "C:/Program Files/Microsoft Visual Studio/2022/Community/VC/Tools/MSVC/14.37.32822/bin/Hostx64/x64";
const MSBUILD: &str =
    "C:/Program Files/Microsoft Visual Studio/2022/Community/MSBuild/Current/Bin/MSBuild.exe";

/// rockbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Source archive settings
    pub source: SourceConfig,

    /// Visual Studio install locations (Windows targets)
    pub msvc: MsvcConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel `make` jobs
    pub jobs: Option<usize>,

    /// Scratch directory for download, extraction and the CMake build tree
    pub scratch_dir: Option<PathBuf>,

    /// Leave the scratch tree in place when a run fails
    pub keep_scratch_on_failure: bool,
}

/// Source archive configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Expected SHA-256 of the release archive
    pub sha256: Option<String>,
}

/// MSVC tool paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsvcConfig {
    pub cl: PathBuf,
    pub ml64: PathBuf,
    pub msbuild: PathBuf,
}

impl Default for MsvcConfig {
    fn default() -> Self {
        MsvcConfig {
            cl: PathBuf::from(format!("{}/cl.exe", MSVC_TOOLS)),
            ml64: PathBuf::from(format!("{}/ml64.exe", MSVC_TOOLS)),
            msbuild: PathBuf::from(MSBUILD),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, using defaults if the file doesn't exist.
    ///
    /// A file that exists but fails to parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Effective `make` parallelism.
    pub fn jobs(&self) -> usize {
        self.build.jobs.filter(|&j| j > 0).unwrap_or(DEFAULT_JOBS)
    }

    /// Effective scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.build
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("rockbuild-build"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.jobs(), DEFAULT_JOBS);
        assert!(!config.build.keep_scratch_on_failure);
        assert!(config.source.sha256.is_none());
        assert!(config.msvc.cl.ends_with("cl.exe"));
        assert!(config.msvc.ml64.ends_with("ml64.exe"));
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
jobs = 4
scratch_dir = "/var/tmp/rocks"
keep_scratch_on_failure = true

[msvc]
msbuild = "D:/VS/MSBuild.exe"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.jobs(), 4);
        assert_eq!(config.scratch_dir(), PathBuf::from("/var/tmp/rocks"));
        assert!(config.build.keep_scratch_on_failure);
        assert_eq!(config.msvc.msbuild, PathBuf::from("D:/VS/MSBuild.exe"));
        // Unset keys keep their defaults
        assert!(config.msvc.cl.ends_with("cl.exe"));
    }

    #[test]
    fn test_zero_jobs_falls_back() {
        let mut config = Config::default();
        config.build.jobs = Some(0);
        assert_eq!(config.jobs(), DEFAULT_JOBS);
    }

    #[test]
    fn test_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build]\njobs = \"many\"\n").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }
}
