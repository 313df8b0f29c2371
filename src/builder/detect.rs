//! Build platform detection.
//!
//! The host and target are queried exactly once per run and then passed
//! around as a [`PlatformDescriptor`]. Nothing downstream re-reads the
//! environment.

use std::path::Path;

use anyhow::Result;

use crate::core::errors::DistError;
use crate::core::layout::DestinationLayout;
use crate::core::platform::{Platform, PlatformDescriptor};
use crate::util::process::{find_go, Executor, ProcessBuilder};

/// Raw `GOOS`/`GOARCH`/`GOHOSTOS`/`GOHOSTARCH` values before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlatform {
    pub goos: String,
    pub goarch: String,
    pub gohostos: String,
    pub gohostarch: String,
}

/// A source of platform facts.
pub trait PlatformQuery {
    fn query(&self) -> Result<RawPlatform, DistError>;
}

/// Asks the Go toolchain, so the staged tree matches what `go build` links.
pub struct GoEnvQuery<'a> {
    executor: &'a dyn Executor,
    go: Option<std::path::PathBuf>,
}

impl<'a> GoEnvQuery<'a> {
    /// Use `go` from PATH.
    pub fn new(executor: &'a dyn Executor) -> Self {
        GoEnvQuery {
            executor,
            go: find_go(),
        }
    }

    /// Use an explicit `go` binary.
    pub fn with_go(executor: &'a dyn Executor, go: impl Into<std::path::PathBuf>) -> Self {
        GoEnvQuery {
            executor,
            go: Some(go.into()),
        }
    }
}

impl PlatformQuery for GoEnvQuery<'_> {
    fn query(&self) -> Result<RawPlatform, DistError> {
        let go = self
            .go
            .as_ref()
            .ok_or_else(|| DistError::environment("`go` not found in PATH"))?;

        let cmd = ProcessBuilder::new(go).args(["env", "GOOS", "GOARCH", "GOHOSTOS", "GOHOSTARCH"]);
        let output = self
            .executor
            .exec(&cmd)
            .map_err(|e| DistError::environment(format!("{:#}", e)))?;
        if !output.status.success() {
            return Err(DistError::environment(format!(
                "`{}` exited with {:?}: {}",
                cmd.display_command(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_go_env(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the four lines printed by `go env GOOS GOARCH GOHOSTOS GOHOSTARCH`.
pub fn parse_go_env(stdout: &str) -> Result<RawPlatform, DistError> {
    let lines: Vec<&str> = stdout.lines().map(str::trim).collect();
    match lines.as_slice() {
        [goos, goarch, gohostos, gohostarch] => Ok(RawPlatform {
            goos: goos.to_string(),
            goarch: goarch.to_string(),
            gohostos: gohostos.to_string(),
            gohostarch: gohostarch.to_string(),
        }),
        _ => Err(DistError::environment(format!(
            "expected 4 lines from `go env`, got {}",
            lines.len()
        ))),
    }
}

/// Derives the host from this binary's build and the target from
/// `GOOS`/`GOARCH`, falling back to the host.
#[derive(Debug, Clone, Default)]
pub struct HostQuery {
    goos: Option<String>,
    goarch: Option<String>,
}

impl HostQuery {
    /// Read `GOOS`/`GOARCH` from the process environment. Empty means unset.
    pub fn from_env() -> Self {
        let var = |key| std::env::var(key).ok().filter(|v| !v.is_empty());
        HostQuery {
            goos: var("GOOS"),
            goarch: var("GOARCH"),
        }
    }

    /// Use explicit target overrides.
    pub fn new(goos: Option<String>, goarch: Option<String>) -> Self {
        HostQuery { goos, goarch }
    }
}

impl PlatformQuery for HostQuery {
    fn query(&self) -> Result<RawPlatform, DistError> {
        let gohostos = go_os(std::env::consts::OS)?;
        let gohostarch = go_arch(std::env::consts::ARCH)?;
        Ok(RawPlatform {
            goos: self.goos.clone().unwrap_or_else(|| gohostos.clone()),
            goarch: self.goarch.clone().unwrap_or_else(|| gohostarch.clone()),
            gohostos,
            gohostarch,
        })
    }
}

fn go_os(os: &str) -> Result<String, DistError> {
    let name = match os {
        "macos" => "darwin",
        "" => return Err(DistError::environment("unknown host OS")),
        other => other,
    };
    Ok(name.to_string())
}

fn go_arch(arch: &str) -> Result<String, DistError> {
    let name = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        "" => return Err(DistError::environment("unknown host architecture")),
        other => other,
    };
    Ok(name.to_string())
}

/// Query the platform once and derive where its artifacts go.
pub fn resolve_platform(
    query: &dyn PlatformQuery,
    root: &Path,
) -> Result<(PlatformDescriptor, DestinationLayout), DistError> {
    let raw = query.query()?;
    let descriptor = PlatformDescriptor::new(
        Platform::parse(&raw.gohostos, &raw.gohostarch)?,
        Platform::parse(&raw.goos, &raw.goarch)?,
    );
    let layout = DestinationLayout::new(root, &descriptor.target);

    tracing::debug!(
        "host {}, target {}, dest {}",
        descriptor.host,
        descriptor.target,
        layout.dest.display()
    );

    Ok((descriptor, layout))
}
