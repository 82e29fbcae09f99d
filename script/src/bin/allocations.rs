//! Derive split allocations (primary and secondary token) from an activity
//! export CSV with columns `address,amount_transferred,avg_amount_held`.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use airgrab_lib::allocation::{derive_allocations, write_allocations, AllocationFormula, Ratio};
use airgrab_lib::io::write_file_atomic;
use airgrab_script::telemetry::{self, LogArgs};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute airgrab allocations from activity metrics", long_about = None)]
struct Args {
    /// Activity CSV path
    #[arg(long, short = 'f')]
    input: PathBuf,

    /// Output CSV path
    #[arg(long)]
    out: PathBuf,

    /// Token decimals used to scale the raw metrics
    #[arg(long, default_value_t = 18)]
    decimals: u32,

    /// Share of the transferred amount counted towards the primary allocation
    #[arg(long, default_value = "0.1")]
    transfer_share: String,

    /// Secondary allocation as a share of the primary allocation
    #[arg(long, default_value = "0.1")]
    secondary_share: String,

    #[arg(long, default_value = "MENTO Allocation")]
    primary_name: String,

    #[arg(long, default_value = "cUSD Allocation")]
    secondary_name: String,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init(&args.log)?;

    let formula = AllocationFormula {
        decimals: args.decimals,
        transfer_share: Ratio::parse(&args.transfer_share).map_err(|e| anyhow!("--transfer-share: {e}"))?,
        secondary_share: Ratio::parse(&args.secondary_share).map_err(|e| anyhow!("--secondary-share: {e}"))?,
    };

    let file = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    let rows = derive_allocations(BufReader::new(file), &formula)
        .with_context(|| format!("deriving allocations from {}", args.input.display()))?;

    let mut buf = Vec::new();
    write_allocations(&mut buf, &rows, &args.primary_name, &args.secondary_name).context("encoding csv")?;
    write_file_atomic(&args.out, &buf).with_context(|| format!("writing {}", args.out.display()))?;

    info!(records = rows.len(), out = %args.out.display(), "wrote allocations");
    println!("{} records written to {}", rows.len(), args.out.display());
    Ok(())
}
