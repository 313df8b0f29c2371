//! Command implementations

pub mod build;
pub mod clean;
pub mod plan;

use anyhow::Result;

use crate::cli::{GlobalArgs, QuerySource};
use rockbuild::builder::{GoEnvQuery, HostQuery, PlatformQuery};
use rockbuild::util::process::SystemExecutor;
use rockbuild::util::GlobalContext;

/// Build the context for `--root` or the current directory.
pub fn context(global: &GlobalArgs) -> Result<GlobalContext> {
    match global.root {
        Some(ref root) => Ok(GlobalContext::with_root(root.clone())),
        None => GlobalContext::new(),
    }
}

/// The platform query selected by `--platform-query`.
pub fn platform_query(global: &GlobalArgs) -> Box<dyn PlatformQuery> {
    match global.platform_query {
        QuerySource::Go => Box::new(GoEnvQuery::new(&SystemExecutor)),
        QuerySource::Host => Box::new(HostQuery::from_env()),
    }
}
