//! TripNow CLI
//!
//! # Usage
//!
//! ```text
//! tripnow [OPTIONS] <COMMAND>
//!
//! Commands:
//!   serve      Run the API server and the risk poller until Ctrl-C
//!   evaluate   Evaluate one reservation through the resilient risk client
//!   poll-once  Run a single poll cycle and print its report
//!
//! Options:
//!   --log-level <LEVEL>  Log level for TripNow crates [default: info]
//!   --data-dir <DIR>     Sled data directory; empty for the in-memory store
//!   --risk-url <URL>     Risk oracle endpoint
//! ```

pub mod commands;
pub mod error;
pub mod handler;

pub use commands::{Cli, Commands};
pub use error::{CliError, CliResult};
