//! CLI Commands
//!
//! Flags override the `TRIPNOW_*` environment, which in turn overrides
//! built-in defaults.

use clap::{Parser, Subcommand};

use tripnow_core::LogLevel;

/// TripNow reservation risk pipeline
#[derive(Parser, Debug)]
#[command(name = "tripnow")]
#[command(version)]
#[command(about = "TripNow reservation risk pipeline")]
#[command(long_about = "Runs the reservation API together with the background risk poller, \
    or performs one-shot risk evaluations and poll cycles.")]
pub struct Cli {
    /// Log level for TripNow crates (RUST_LOG takes precedence)
    #[arg(long, env = "TRIPNOW_LOG_LEVEL", default_value = "info", value_parser = parse_log_level)]
    pub log_level: LogLevel,

    /// Sled data directory; an empty value selects the in-memory store
    #[arg(long, env = "TRIPNOW_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Risk oracle endpoint
    #[arg(long, env = "TRIPNOW_RISK_URL")]
    pub risk_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server and the risk poller until Ctrl-C
    Serve {
        /// Host to bind to (env: TRIPNOW_API_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Port to listen on (env: TRIPNOW_API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Seconds between poll cycles (env: TRIPNOW_POLL_INTERVAL_SECS)
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Evaluate one reservation through the resilient risk client
    Evaluate {
        #[arg(long)]
        email: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        amount: i64,
    },

    /// Run a single poll cycle and print its report
    PollOnce,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::parse(s).ok_or_else(|| format!("unknown log level '{}'", s))
}
