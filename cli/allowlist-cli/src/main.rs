#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build_tree;
mod check;
mod claim;

#[derive(Parser, Debug)]
#[command(name = "allowlist")]
#[command(about = "Merkle allowlist tools for token distributions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the Merkle root and per-recipient proofs from a recipient list
    BuildTree(build_tree::Cli),
    /// Extract the claim data for one address from a built allowlist
    Claim(claim::Cli),
    /// Check a proof against a published root
    Verify(check::Cli),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(args)?,
        Commands::Claim(args) => claim::run(&args)?,
        Commands::Verify(args) => check::run(&args)?,
    }

    Ok(())
}
