//! laundry-agent CLI: washer or dryer mode.
//!
//! Logging: set `RUST_LOG=laundry_agent=info` (or `warn`, `debug`) to see
//! agent logs on stderr.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use laundry_agent::{LaundryConfig, run_dryer, run_washer};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let verbose = matches!(
            &cli.command,
            Command::Washer { verbose: true } | Command::Dryer { verbose: true, .. }
        );
        EnvFilter::new(if verbose {
            "laundry_agent=debug"
        } else {
            "laundry_agent=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = LaundryConfig::from_env();

    match cli.command {
        Command::Washer { verbose: _ } => run_washer(&config).await,
        Command::Dryer { bind, verbose: _ } => run_dryer(&config, Some(bind)).await,
    }
}
