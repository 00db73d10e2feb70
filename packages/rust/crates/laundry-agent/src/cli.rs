use clap::{Parser, Subcommand};

use laundry_agent::DEFAULT_DRYER_BIND;

#[derive(Parser)]
#[command(name = "laundry-agent")]
#[command(about = "Laundry agents: washer stop debounce or dryer quiet-window watch.")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Watch the washing machine through the camera pipeline.
    Washer {
        /// Log at debug instead of info.
        #[arg(long)]
        verbose: bool,
    },
    /// Serve dryer vibration ingest and watch for a quiet window.
    Dryer {
        /// Listen address for the ingest server.
        #[arg(long, default_value = DEFAULT_DRYER_BIND)]
        bind: String,

        /// Log at debug instead of info.
        #[arg(long)]
        verbose: bool,
    },
}
