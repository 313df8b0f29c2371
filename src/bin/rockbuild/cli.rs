//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// rockbuild - builds and stages a static RocksDB for the Go binding
#[derive(Parser)]
#[command(name = "rockbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root holding `dist/` and the CMake toolchain files
    /// (defaults to current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Where host and target platform facts come from
    #[arg(long, global = true, value_enum, default_value_t = QuerySource::Go)]
    pub platform_query: QuerySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuerySource {
    /// `go env GOOS GOARCH GOHOSTOS GOHOSTARCH`
    Go,
    /// This binary's host, with GOOS/GOARCH as target overrides
    Host,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, build, and stage RocksDB for the current target
    Build(BuildArgs),

    /// Show the build configuration for the current target without building
    Plan(PlanArgs),

    /// Remove the staged output for the current target
    Clean(CleanArgs),

    /// Run the Go binding's tests against the staged library
    Test(TestArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Number of parallel make jobs (overrides config)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Emit the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Remove the whole `dist/` directory, all platforms
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct TestArgs {
    /// Extra arguments passed to `go test` (after `--`)
    #[arg(last = true)]
    pub args: Vec<String>,
}
