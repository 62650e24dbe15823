use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use allowlist_cli::{write_file_atomic, Allowlist};

#[derive(Args, Debug)]
pub struct Cli {
    /// Allowlist JSON produced by `build-tree`
    #[arg(short, long)]
    allowlist: PathBuf,

    /// Address to look up (any casing)
    #[arg(short = 'r', long)]
    address: String,

    /// Output JSON file; printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClaimOutput {
    merkle_root: String,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    merkle_proof: Vec<String>,
    leaf_index: usize,
}

fn build_claim(allowlist: &Allowlist, address: &str) -> Result<ClaimOutput> {
    let eligibility = allowlist
        .eligibility(address)
        .context("Invalid address")?;
    let proof = eligibility
        .proof
        .context("Address not found in allowlist or its proof does not verify")?;
    let recipient = allowlist
        .get(address)?
        .context("Address not found in allowlist")?;

    Ok(ClaimOutput {
        merkle_root: allowlist.root.clone(),
        address: recipient.address.clone(),
        amount: if allowlist.mode.is_custom() {
            recipient.amount.clone()
        } else {
            None
        },
        merkle_proof: proof,
        leaf_index: recipient.leaf_index,
    })
}

pub fn run(cli: &Cli) -> Result<()> {
    println!("Loading allowlist from {:?}...", cli.allowlist);
    let allowlist =
        Allowlist::from_json_file(&cli.allowlist).context("Failed to load allowlist")?;

    let claim = build_claim(&allowlist, &cli.address)?;
    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;

    match &cli.output {
        Some(path) => {
            println!("Writing claim JSON to {:?}...", path);
            write_file_atomic(path, &json_output).context("Failed to write claim file")?;
            println!("Proof length: {} nodes", claim.merkle_proof.len());
        }
        None => println!("{json_output}"),
    }

    Ok(())
}
