//! Platform identifiers in Go's `GOOS`/`GOARCH` vocabulary.

use std::fmt;

use serde::Serialize;

use crate::core::errors::DistError;

/// Operating system of a build host or target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    /// Any other `GOOS` value; built with generic flags.
    Other(String),
}

/// CPU architecture of a build host or target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
    Other(String),
}

impl Os {
    /// Parse a `GOOS` identifier.
    pub fn parse(s: &str) -> Result<Self, DistError> {
        validate_ident("OS", s)?;
        Ok(match s {
            "linux" => Os::Linux,
            "darwin" => Os::Darwin,
            "windows" => Os::Windows,
            other => Os::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::Other(s) => s,
        }
    }
}

impl Arch {
    /// Parse a `GOARCH` identifier.
    pub fn parse(s: &str) -> Result<Self, DistError> {
        validate_ident("architecture", s)?;
        Ok(match s {
            "amd64" => Arch::Amd64,
            "arm64" => Arch::Arm64,
            other => Arch::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Other(s) => s,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Os {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for Arch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Identifiers must be non-empty lowercase ASCII alphanumerics, as Go emits them.
fn validate_ident(kind: &str, s: &str) -> Result<(), DistError> {
    if s.is_empty() {
        return Err(DistError::environment(format!("empty {} identifier", kind)));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(DistError::environment(format!(
            "malformed {} identifier `{}`",
            kind, s
        )));
    }
    Ok(())
}

/// An OS/architecture pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Platform { os, arch }
    }

    /// Parse from raw `GOOS`/`GOARCH` strings.
    pub fn parse(os: &str, arch: &str) -> Result<Self, DistError> {
        Ok(Platform {
            os: Os::parse(os)?,
            arch: Arch::parse(arch)?,
        })
    }

    /// The `<os>_<arch>` directory name used under `dist/`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// The resolved host and target of a build run. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformDescriptor {
    pub host: Platform,
    pub target: Platform,
}

impl PlatformDescriptor {
    pub fn new(host: Platform, target: Platform) -> Self {
        PlatformDescriptor { host, target }
    }

    /// Whether the target differs from the host.
    pub fn is_cross(&self) -> bool {
        self.host != self.target
    }
}
