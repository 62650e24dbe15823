use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::warn;

use allowlist_cli::{
    build_allowlist, filter_valid, write_file_atomic, BuildOptions, DistributionMode, Recipient,
};

#[derive(Args, Debug)]
pub struct Cli {
    /// Input file with one `address[,amount]` per line
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file (root, proofs and recipients)
    #[arg(short, long)]
    output: PathBuf,

    /// Output file for the bare Merkle root
    #[arg(short, long)]
    root_output: Option<PathBuf>,

    /// Hash per-recipient amounts into the leaves (custom distribution)
    #[arg(long)]
    custom: bool,

    /// Amount used for rows without one, in custom distribution mode
    #[arg(long, default_value = "0")]
    default_amount: String,

    /// Skip rows with invalid addresses instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Do not re-verify every proof against the root after building
    #[arg(long)]
    no_self_check: bool,
}

/// Reads recipient rows: `address` or `address,amount`.
///
/// Blank lines, `#` comments and a leading `address,...` header are skipped.
pub fn parse_recipients(reader: impl BufRead) -> Result<Vec<Recipient>> {
    let mut recipients = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if recipients.is_empty() && fields[0].eq_ignore_ascii_case("address") {
            continue;
        }
        let recipient = match fields.as_slice() {
            [address] => Recipient::new(*address),
            [address, ""] => Recipient::new(*address),
            [address, amount] => Recipient::with_amount(*address, *amount),
            _ => anyhow::bail!(
                "Invalid format at line {}: expected 'address[,amount]', got '{}'",
                line_num + 1,
                trimmed
            ),
        };
        recipients.push(recipient);

        if (line_num + 1) % 1_000_000 == 0 {
            println!("Processed {} lines...", line_num + 1);
        }
    }
    Ok(recipients)
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Reading recipients from {:?}...", cli.input);
    let file = File::open(&cli.input).context("Failed to open input file")?;
    let mut recipients = parse_recipients(BufReader::new(file))?;

    if cli.skip_invalid {
        let before = recipients.len();
        recipients = filter_valid(recipients);
        if recipients.len() != before {
            warn!(skipped = before - recipients.len(), "skipped invalid rows");
        }
    }

    let options = BuildOptions {
        mode: if cli.custom {
            DistributionMode::Custom {
                default_amount: cli.default_amount,
            }
        } else {
            DistributionMode::Equal
        },
        self_check: !cli.no_self_check,
    };

    println!("Total recipients: {}", recipients.len());
    println!("Building Merkle tree...");
    let allowlist = build_allowlist(&recipients, &options).context("Failed to build allowlist")?;

    println!("Merkle root: {}", allowlist.root);
    println!("Tree height: {}", allowlist.height);

    if let Some(root_path) = &cli.root_output {
        write_file_atomic(root_path, &format!("{}\n", allowlist.root))
            .context("Failed to write root")?;
    }

    println!("Writing allowlist to {:?}...", cli.output);
    allowlist
        .write_json_file(&cli.output)
        .context("Failed to write allowlist")?;

    println!("Done!");
    Ok(())
}
