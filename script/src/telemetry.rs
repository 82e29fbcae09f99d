use anyhow::{anyhow, Result};
use clap::Args;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Emit logs as JSON lines
    #[arg(long, env = "AIRGRAB_LOG_JSON")]
    pub log_json: bool,
}

/// Logs go to stderr so stdout stays machine-readable.
pub fn init(args: &LogArgs) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if args.log_json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };
    installed.map_err(|e| anyhow!("installing log subscriber: {e}"))
}
