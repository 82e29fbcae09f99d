//! Print the claim (amount, leaf, proof) for one address from a built tree.

use std::path::PathBuf;

use airgrab_lib::{AllocationService, Claim, Record};
use airgrab_script::config::{RoundArgs, RoundConfig};
use airgrab_script::telemetry::{self, LogArgs};
use anyhow::{bail, Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate an airgrab Merkle proof for an address", long_about = None)]
struct Args {
    #[command(flatten)]
    round: RoundArgs,

    /// Tree artifact (default: <data-dir>/airgrab.<round>.tree.json)
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Claimant address (0x-prefixed hex, any case)
    #[arg(long)]
    address: String,

    /// Re-derive the leaf from this amount and look it up by value
    #[arg(long)]
    amount: Option<String>,

    /// Scale `--amount` by 10^decimals
    #[arg(long, default_value_t = 0)]
    decimals: u32,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init(&args.log)?;
    let cfg = RoundConfig::from_args(&args.round)?;
    let path = args.file.clone().unwrap_or_else(|| cfg.tree_path());
    let service = AllocationService::open(&path).with_context(|| format!("loading tree {}", path.display()))?;

    let found = match &args.amount {
        Some(amount) => {
            let record = Record::parse(&args.address, amount, args.decimals).context("parsing claim")?;
            let leaf = record.leaf();
            service
                .proof_for_leaf(&leaf)
                .map(|proof| Claim { record, leaf, root: service.root(), proof })
        }
        None => service.claim_for(&args.address),
    };
    let claim = match found {
        Ok(claim) => claim,
        Err(e) if e.is_not_found() => bail!("{} is not eligible in round {}", args.address, cfg.round),
        Err(e) => return Err(anyhow::Error::new(e).context("looking up claim")),
    };

    let json = claim.to_json();
    let s = if args.pretty { serde_json::to_string_pretty(&json) } else { serde_json::to_string(&json) }?;
    println!("{}", s);
    Ok(())
}
