use anyhow::{Context, Result};
use clap::Args;

use allowlist_cli::{parse_hash32, parse_proof, verify, verify_bounded};

#[derive(Args, Debug)]
pub struct Cli {
    /// Published Merkle root (hex)
    #[arg(long)]
    root: String,

    /// Claiming address (any casing)
    #[arg(short, long)]
    address: String,

    /// Amount hashed into the leaf, for custom distributions
    #[arg(long)]
    amount: Option<String>,

    /// Comma-separated sibling hashes, bottom to top; empty for a single-leaf tree
    #[arg(short, long, value_delimiter = ',', num_args = 0..)]
    proof: Vec<String>,

    /// Number of leaves in the tree; rejects proofs too long for it
    #[arg(long)]
    leaf_count: Option<usize>,
}

fn check(cli: &Cli) -> Result<bool> {
    let root = parse_hash32(&cli.root).context("Invalid Merkle root")?;
    let siblings = parse_proof(&cli.proof).context("Invalid proof element")?;
    let amount = cli.amount.as_deref();
    let valid = match cli.leaf_count {
        Some(leaf_count) => verify_bounded(&cli.address, amount, &siblings, &root, leaf_count)?,
        None => verify(&cli.address, amount, &siblings, &root)?,
    };
    Ok(valid)
}

pub fn run(cli: &Cli) -> Result<()> {
    let valid = check(cli)?;
    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(())
}
