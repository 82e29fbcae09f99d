//! Build the airgrab Merkle tree for one round from its snapshot CSV.
//! Writes `airgrab.<round>.tree.json` and `airgrab.<round>.root.json`.

use std::path::PathBuf;

use airgrab_lib::samples::build_sample_snapshot_with_records;
use airgrab_lib::util::hex0x;
use airgrab_lib::{read_snapshot_file, AirgrabTree, DuplicatePolicy, SnapshotOptions};
use airgrab_script::config::{root_path_for, RoundArgs, RoundConfig};
use airgrab_script::telemetry::{self, LogArgs};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build the airgrab Merkle tree for a distribution round", long_about = None)]
struct Args {
    #[command(flatten)]
    round: RoundArgs,

    /// Snapshot CSV (default: <data-dir>/airgrab.<round>.csv)
    #[arg(long, short = 'f')]
    input: Option<PathBuf>,

    /// Tree artifact path (default: <data-dir>/airgrab.<round>.tree.json)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Column holding the address (header CSVs only)
    #[arg(long)]
    address_column: Option<String>,

    /// Column holding the amount committed to the tree (header CSVs only)
    #[arg(long)]
    amount_column: Option<String>,

    /// Comma-separated columns that must sum exactly to the amount column
    #[arg(long, value_delimiter = ',')]
    components: Vec<String>,

    /// Scale amounts by 10^decimals (0 = amounts are already in smallest units)
    #[arg(long, default_value_t = 0)]
    decimals: u32,

    /// Sum duplicate address rows instead of failing
    #[arg(long, default_value_t = false)]
    merge_duplicates: bool,

    /// Pretty-print the tree artifact
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Use a built-in sample snapshot of this many records instead of reading a file
    #[arg(long)]
    sample: Option<usize>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init(&args.log)?;
    let cfg = RoundConfig::from_args(&args.round)?;

    let snapshot = match args.sample {
        Some(n) => build_sample_snapshot_with_records(n).context("building sample snapshot")?,
        None => {
            let input = args.input.clone().unwrap_or_else(|| cfg.snapshot_path());
            let opts = SnapshotOptions {
                address_column: args.address_column.clone(),
                amount_column: args.amount_column.clone(),
                components: args.components.clone(),
                decimals: args.decimals,
                duplicates: if args.merge_duplicates { DuplicatePolicy::Merge } else { DuplicatePolicy::Reject },
            };
            info!(path = %input.display(), round = %cfg.round, "reading snapshot");
            read_snapshot_file(&input, &opts).with_context(|| format!("reading snapshot {}", input.display()))?
        }
    };

    let tree = AirgrabTree::build(&snapshot).context("building merkle tree")?;

    let (tree_path, root_path) = match &args.out {
        Some(out) => (out.clone(), root_path_for(out)),
        None => (cfg.tree_path(), cfg.root_path()),
    };
    tree.write_to(&tree_path, Some(&root_path), args.pretty)
        .with_context(|| format!("writing {}", tree_path.display()))?;
    info!(tree = %tree_path.display(), root_file = %root_path.display(), "wrote artifacts");

    println!("Number of records in snapshot: {}", snapshot.len());
    if let Some(total) = snapshot.total() {
        println!("Total allocation: {total}");
    }
    println!("Root: {}", hex0x(tree.root()));
    Ok(())
}
