//! Re-verify a published tree artifact and optionally compare its root with
//! the root the claim contract was deployed with.

use std::path::PathBuf;

use airgrab_lib::util::{hex0x, parse_hex};
use airgrab_lib::AirgrabTree;
use airgrab_script::config::{RoundArgs, RoundConfig};
use airgrab_script::telemetry::{self, LogArgs};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check an airgrab tree artifact and its root", long_about = None)]
struct Args {
    #[command(flatten)]
    round: RoundArgs,

    /// Tree artifact (default: <data-dir>/airgrab.<round>.tree.json)
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Root expected on chain (0x-prefixed bytes32)
    #[arg(long)]
    expected_root: Option<String>,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init(&args.log)?;
    let cfg = RoundConfig::from_args(&args.round)?;
    let path = args.file.clone().unwrap_or_else(|| cfg.tree_path());

    let tree = AirgrabTree::read_from(&path).with_context(|| format!("loading tree {}", path.display()))?;
    tree.self_test().context("verifying proofs")?;
    info!(entries = tree.entries().len(), "all entry proofs verify");

    if let Some(expected) = &args.expected_root {
        let expected = parse_hex::<32>(expected).map_err(|e| anyhow!("invalid --expected-root: {e}"))?;
        if expected != tree.root() {
            bail!("root mismatch: artifact has {}, expected {}", hex0x(tree.root()), hex0x(expected));
        }
        info!("root matches expected value");
    }

    println!("Records: {}", tree.len());
    println!("Root: {}", hex0x(tree.root()));
    println!("OK");
    Ok(())
}
