//! CMake driver for the extracted RocksDB source tree.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::toolchain::{BuildConfiguration, BuildDriver};
use crate::core::errors::DistError;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, find_executable, Executor, ProcessBuilder};

/// Name of the build-staging directory inside the source tree.
pub const BUILD_DIR_NAME: &str = "build_place";

/// Runs configure, compile and install for one [`BuildConfiguration`].
pub struct CMakeBuilder<'a> {
    config: &'a BuildConfiguration,
    executor: &'a dyn Executor,
    cmake: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
}

impl<'a> CMakeBuilder<'a> {
    /// Create a builder for `source_dir`, staging into `source_dir/build_place`.
    pub fn new(
        config: &'a BuildConfiguration,
        executor: &'a dyn Executor,
        cmake: PathBuf,
        source_dir: &Path,
    ) -> Self {
        CMakeBuilder {
            config,
            executor,
            cmake,
            build_dir: source_dir.join(BUILD_DIR_NAME),
            source_dir: source_dir.to_path_buf(),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Configure, compile, and install, stopping at the first failure.
    pub fn build(&self) -> Result<()> {
        ensure_dir(self.build_dir())?;

        self.configure()?;
        self.compile()?;
        self.install()
    }

    /// Attach the run's environment to a command rooted in the build dir.
    fn command(&self, program: impl AsRef<Path>) -> ProcessBuilder {
        ProcessBuilder::new(program)
            .cwd(self.build_dir())
            .envs(&self.config.env)
    }

    /// The CMake configure command.
    pub fn configure_command(&self) -> ProcessBuilder {
        self.command(&self.cmake)
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(self.build_dir())
            .args(&self.config.cmake_params)
    }

    /// The compile command for the selected driver.
    pub fn compile_command(&self) -> ProcessBuilder {
        match &self.config.driver {
            BuildDriver::Make { jobs } => self.command("make").arg(format!("-j{}", jobs)),
            BuildDriver::MsBuild { msbuild } => self.command(msbuild).args([
                "ALL_BUILD.vcxproj",
                "/p:Configuration=Release",
                "/m",
            ]),
        }
    }

    /// The install command; stripped except under MSBuild.
    pub fn install_command(&self) -> ProcessBuilder {
        match &self.config.driver {
            BuildDriver::Make { .. } => self.command("make").arg("install/strip"),
            BuildDriver::MsBuild { msbuild } => self
                .command(msbuild)
                .args(["INSTALL.vcxproj", "/p:Configuration=Release"]),
        }
    }

    fn configure(&self) -> Result<()> {
        tracing::info!("Configuring RocksDB ({})", self.config.profile);
        self.executor.stream_and_check(&self.configure_command())?;
        Ok(())
    }

    fn compile(&self) -> Result<()> {
        tracing::info!("Compiling RocksDB");
        self.executor.stream_and_check(&self.compile_command())?;
        Ok(())
    }

    fn install(&self) -> Result<()> {
        tracing::info!("Installing RocksDB");
        self.executor.stream_and_check(&self.install_command())?;
        Ok(())
    }
}

/// Locate the executables `config` will spawn, failing before any download.
pub fn find_build_tools(config: &BuildConfiguration) -> Result<PathBuf, DistError> {
    let missing = |tool: &str| DistError::Tool {
        command: tool.to_string(),
        code: None,
        stderr: format!("`{}` not found in PATH", tool),
    };

    let cmake = find_cmake().ok_or_else(|| missing("cmake"))?;
    if let BuildDriver::Make { .. } = config.driver {
        find_executable("make").ok_or_else(|| missing("make"))?;
    }
    Ok(cmake)
}
