//! rockbuild CLI - stages RocksDB for the Go binding package

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("rockbuild=debug")
    } else {
        EnvFilter::new("rockbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &cli.global),
        Commands::Plan(args) => commands::plan::execute(args, &cli.global),
        Commands::Clean(args) => commands::clean::execute(args, &cli.global),
        Commands::Test(args) => commands::test::execute(args, &cli.global),
    }
}
