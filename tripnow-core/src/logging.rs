//! Logging Conventions
//!
//! Log levels used across TripNow crates:
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Circuit opened, poll cycle failed, reservation failed to resolve |
//! | WARN  | Non-success oracle status, retry scheduled, fallback or local error outcome |
//! | INFO  | Poller start/stop, cycle summary, reservation created or resolved, circuit closed |
//! | DEBUG | Finished evaluations, half-open probes, inconclusive outcomes, empty cycles |
//!
//! Always log with structured fields (`reservation_id`, `attempt`, `error`, ...):
//!
//! ```ignore
//! info!(reservation_id = %id, status = %status, "Reservation resolved");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Crates covered by the default filter
const TRIPNOW_TARGETS: [&str; 6] = [
    "tripnow",
    "tripnow_core",
    "tripnow_store",
    "tripnow_risk",
    "tripnow_worker",
    "tripnow_api",
];

/// Log level enumeration matching tracing levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// `EnvFilter` directive enabling this level for every TripNow crate
    pub fn directive(&self) -> String {
        TRIPNOW_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_directive_covers_all_crates() {
        let directive = LogLevel::Debug.directive();
        assert!(directive.starts_with("tripnow=debug"));
        assert!(directive.contains("tripnow_worker=debug"));
        assert!(directive.contains("tripnow_risk=debug"));
    }
}
