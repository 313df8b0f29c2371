//! Implementation of `rockbuild build`.
//!
//! One run stages RocksDB for exactly one target platform:
//! resolve platform, reset `dist/<os>_<arch>`, select the configuration,
//! fetch and build in scratch space, then prune the install.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::cmake::{find_build_tools, CMakeBuilder};
use crate::builder::detect::{resolve_platform, PlatformQuery};
use crate::builder::toolchain::{select, BuildConfiguration, SelectorInputs};
use crate::core::layout::DestinationLayout;
use crate::core::platform::PlatformDescriptor;
use crate::core::source::PinnedSource;
use crate::ops::prepare::prepare_destination;
use crate::ops::prune::{prune_install, verify_artifacts};
use crate::sources::tarball::{fetch_source, Fetch};
use crate::util::config::Config;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::process::Executor;

/// Options for a distribution build.
#[derive(Debug, Clone)]
pub struct DistOptions {
    /// Release archive to build
    pub source: PinnedSource,

    /// Scratch directory; each run works in its own `rockbuild-<version>`
    /// subdirectory of it
    pub scratch_dir: PathBuf,

    /// Leave the scratch tree behind when the run fails
    pub keep_scratch_on_failure: bool,

    /// Plumbing inputs for the selector
    pub inputs: SelectorInputs,

    /// CMake binary; looked up in PATH when unset
    pub cmake: Option<PathBuf>,
}

impl DistOptions {
    /// Options for the pinned RocksDB release under `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = PinnedSource::rocksdb()?.with_sha256(config.source.sha256.clone());
        Ok(DistOptions {
            source,
            scratch_dir: config.scratch_dir(),
            keep_scratch_on_failure: config.build.keep_scratch_on_failure,
            inputs: SelectorInputs::from_config(config),
            cmake: None,
        })
    }
}

/// The collaborators a run talks to.
pub struct DistTools<'a> {
    pub executor: &'a dyn Executor,
    pub fetcher: &'a dyn Fetch,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct DistResult {
    pub platform: PlatformDescriptor,
    pub layout: DestinationLayout,
    pub config: BuildConfiguration,
    /// Staged static libraries
    pub libraries: Vec<PathBuf>,
}

/// Resolve the platform and select its configuration without side effects.
pub fn plan(
    query: &dyn PlatformQuery,
    root: &Path,
    inputs: &SelectorInputs,
) -> Result<(PlatformDescriptor, DestinationLayout, BuildConfiguration)> {
    let (platform, layout) = resolve_platform(query, root)?;
    let config = select(&platform, &layout, inputs);
    Ok((platform, layout, config))
}

/// Run a full build for the platform reported by `query`.
pub fn dist_build(
    query: &dyn PlatformQuery,
    root: &Path,
    opts: &DistOptions,
    tools: &DistTools<'_>,
) -> Result<DistResult> {
    let (platform, layout) = resolve_platform(query, root)?;
    let scratch = scratch_path(opts, &layout)?;
    tracing::info!(
        "Building RocksDB {} for {}",
        opts.source.version,
        platform.target
    );
    if platform.is_cross() {
        tracing::info!("Cross-compiling from {}", platform.host);
    }

    prepare_destination(&layout)?;

    let config = select(&platform, &layout, &opts.inputs);
    build_in_scratch(&config, &scratch, opts, tools)?;

    prune_install(&layout)?;
    let libraries = verify_artifacts(&layout)?;

    Ok(DistResult {
        platform,
        layout,
        config,
        libraries,
    })
}

/// The directory a run owns inside the configured scratch directory,
/// `<scratch_dir>/rockbuild-<version>`.
///
/// A relative scratch directory is taken relative to the project root. A
/// scratch directory that is, or contains, the project root is rejected.
pub fn scratch_path(opts: &DistOptions, layout: &DestinationLayout) -> Result<PathBuf> {
    let base = layout.project_root.join(&opts.scratch_dir);

    let normalize = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    if normalize(&layout.project_root).starts_with(normalize(&base)) {
        bail!(
            "scratch directory {} contains the project root {}",
            base.display(),
            layout.project_root.display()
        );
    }

    Ok(base.join(format!("rockbuild-{}", opts.source.version)))
}

/// Fetch, extract, configure, compile and install inside `scratch`.
///
/// Installs into the prefix baked into `config`. The scratch tree is
/// removed on every exit path unless `keep_scratch_on_failure` is set and
/// the run failed.
pub fn build_in_scratch(
    config: &BuildConfiguration,
    scratch: &Path,
    opts: &DistOptions,
    tools: &DistTools<'_>,
) -> Result<()> {
    let cmake = match opts.cmake {
        Some(ref cmake) => cmake.clone(),
        None => find_build_tools(config)?,
    };

    if let Some(ref file) = config.toolchain_file {
        if !file.is_file() {
            bail!("toolchain file not found: {}", file.display());
        }
    }

    let scratch = ScratchDir::create(scratch, opts.keep_scratch_on_failure)?;

    let source_dir = fetch_source(tools.fetcher, &opts.source, scratch.path())?;
    CMakeBuilder::new(config, tools.executor, cmake, &source_dir).build()?;

    scratch.finish()
}

/// Scratch directory removed when dropped.
struct ScratchDir {
    path: PathBuf,
    keep_on_failure: bool,
    armed: bool,
}

impl ScratchDir {
    /// Start from an empty scratch directory, discarding leftovers.
    fn create(path: &Path, keep_on_failure: bool) -> Result<Self> {
        remove_dir_all_if_exists(path)?;
        ensure_dir(path)?;
        Ok(ScratchDir {
            path: path.to_path_buf(),
            keep_on_failure,
            armed: true,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Successful run: remove the tree and report failures.
    fn finish(mut self) -> Result<()> {
        self.armed = false;
        tracing::debug!("removing scratch {}", self.path.display());
        remove_dir_all_if_exists(&self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if self.keep_on_failure {
            tracing::warn!("build failed; scratch kept at {}", self.path.display());
        } else if let Err(e) = remove_dir_all_if_exists(&self.path) {
            tracing::warn!("{:#}", e);
        }
    }
}
