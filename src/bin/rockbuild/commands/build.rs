//! `rockbuild build` command

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use rockbuild::ops::{dist_build, DistOptions, DistTools};
use rockbuild::sources::HttpFetcher;
use rockbuild::util::process::SystemExecutor;

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::context(global)?;
    let config = ctx.load_config()?;

    let mut opts = DistOptions::from_config(&config)?;
    // CLI overrides config
    if let Some(jobs) = args.jobs.filter(|&j| j > 0) {
        opts.inputs.jobs = jobs;
    }

    let query = super::platform_query(global);
    let tools = DistTools {
        executor: &SystemExecutor,
        fetcher: &HttpFetcher,
    };

    let result = dist_build(query.as_ref(), ctx.root(), &opts, &tools)?;

    eprintln!(
        "    Finished rocksdb {} for {} -> {}",
        opts.source.version,
        result.platform.target,
        result.layout.dest.display()
    );

    Ok(())
}
