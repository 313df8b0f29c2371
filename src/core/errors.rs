//! Error taxonomy for a distribution build.

use std::path::PathBuf;

use thiserror::Error;

/// A fatal failure during a distribution build.
///
/// Every variant aborts the whole run; a clean re-run is the recovery path.
#[derive(Debug, Error)]
pub enum DistError {
    #[error("failed to resolve build platform: {message}")]
    EnvironmentResolution { message: String },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("`{command}` failed with exit code {code:?}\n{stderr}")]
    Tool {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no static library found under {}", dest.display())]
    MissingArtifact { dest: PathBuf },

    #[error("invalid pinned source: {message}")]
    InvalidSource { message: String },
}

impl DistError {
    pub(crate) fn environment(message: impl Into<String>) -> Self {
        DistError::EnvironmentResolution {
            message: message.into(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        DistError::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}
