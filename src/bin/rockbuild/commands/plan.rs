//! `rockbuild plan` command

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, PlanArgs};
use rockbuild::builder::SelectorInputs;
use rockbuild::ops::plan;

pub fn execute(args: PlanArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::context(global)?;
    let config = ctx.load_config()?;
    let query = super::platform_query(global);

    let (platform, layout, build) = plan(
        query.as_ref(),
        ctx.root(),
        &SelectorInputs::from_config(&config),
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&build)
            .context("failed to serialize build configuration")?;
        println!("{}", json);
        return Ok(());
    }

    println!("# host:    {}", platform.host);
    if platform.is_cross() {
        println!("# target:  {} (cross)", platform.target);
    } else {
        println!("# target:  {}", platform.target);
    }
    println!("# profile: {}", build.profile);
    println!("# dest:    {}", layout.dest.display());
    if let Some(ref file) = build.toolchain_file {
        println!("# toolchain file: {}", file.display());
    }
    println!("# environment:");
    for (key, value) in &build.env {
        println!("  {}={}", key, value);
    }
    println!("# cmake parameters:");
    for param in &build.cmake_params {
        println!("  {}", param);
    }

    Ok(())
}
