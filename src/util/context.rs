//! Global context for rockbuild operations.
//!
//! Provides centralized access to the project root and derived paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::layout::DIST_DIR;
use crate::util::config::Config;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root; `dist/` and the CMake toolchain files live here
    root: PathBuf,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_root(cwd))
    }

    /// Create a context rooted at `root`.
    pub fn with_root(root: PathBuf) -> Self {
        GlobalContext { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/dist`
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(DIST_DIR)
    }

    /// `<root>/.rockbuild`
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(".rockbuild")
    }

    /// `<root>/.rockbuild/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Load the project configuration.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(&self.config_path())
    }
}
