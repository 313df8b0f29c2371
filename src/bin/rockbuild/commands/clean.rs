//! `rockbuild clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use rockbuild::builder::resolve_platform;
use rockbuild::util::fs::remove_dir_all_if_exists;

pub fn execute(args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = super::context(global)?;

    let dir = if args.all {
        ctx.dist_dir()
    } else {
        let query = super::platform_query(global);
        let (_, layout) = resolve_platform(query.as_ref(), ctx.root())?;
        layout.dest
    };

    remove_dir_all_if_exists(&dir)?;
    eprintln!("     Removed {}", dir.display());

    Ok(())
}
