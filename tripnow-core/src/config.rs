//! TripNow Configuration
//!
//! Settings for the risk client, the background poller and storage.
//! Supports loading from environment variables with the `TRIPNOW_` prefix.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Resilient risk client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Risk oracle endpoint (POST)
    pub url: String,
    /// Per HTTP request timeout in seconds
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff base; the delay before retry `n` is `base^n` seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,
    /// Consecutive failed calls before the circuit opens
    #[serde(default = "default_breaker_threshold")]
    pub breaker_failure_threshold: u32,
    /// How long the circuit stays open, in seconds
    #[serde(default = "default_breaker_open")]
    pub breaker_open_secs: u64,
    /// Overall timeout around circuit breaker and retries, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_attempt_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    2
}

fn default_breaker_threshold() -> u32 {
    3
}

fn default_breaker_open() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8081/api/risk/evaluate".to_string(),
            attempt_timeout_secs: default_attempt_timeout(),
            max_retries: default_max_retries(),
            backoff_base_secs: default_backoff_base(),
            breaker_failure_threshold: default_breaker_threshold(),
            breaker_open_secs: default_breaker_open(),
            timeout_secs: default_timeout(),
        }
    }
}

impl RiskConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - TRIPNOW_RISK_URL: risk oracle endpoint
    /// - TRIPNOW_RISK_ATTEMPT_TIMEOUT_SECS: per request timeout
    /// - TRIPNOW_RISK_MAX_RETRIES: retries after the first attempt
    /// - TRIPNOW_RISK_BACKOFF_BASE_SECS: exponential backoff base
    /// - TRIPNOW_RISK_BREAKER_THRESHOLD: failures before the circuit opens
    /// - TRIPNOW_RISK_BREAKER_OPEN_SECS: open circuit duration
    /// - TRIPNOW_RISK_TIMEOUT_SECS: overall timeout
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("TRIPNOW_RISK_URL").unwrap_or(defaults.url),
            attempt_timeout_secs: env_parse("TRIPNOW_RISK_ATTEMPT_TIMEOUT_SECS")
                .unwrap_or(defaults.attempt_timeout_secs),
            max_retries: env_parse("TRIPNOW_RISK_MAX_RETRIES").unwrap_or(defaults.max_retries),
            backoff_base_secs: env_parse("TRIPNOW_RISK_BACKOFF_BASE_SECS")
                .unwrap_or(defaults.backoff_base_secs),
            breaker_failure_threshold: env_parse("TRIPNOW_RISK_BREAKER_THRESHOLD")
                .unwrap_or(defaults.breaker_failure_threshold),
            breaker_open_secs: env_parse("TRIPNOW_RISK_BREAKER_OPEN_SECS")
                .unwrap_or(defaults.breaker_open_secs),
            timeout_secs: env_parse("TRIPNOW_RISK_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
        }
    }

    /// Set the oracle endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn breaker_open_duration(&self) -> Duration {
        Duration::from_secs(self.breaker_open_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Background poller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Wait between cycles in seconds
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// Cap on reservations listed per cycle (None = unbounded)
    #[serde(default)]
    pub batch_limit: Option<usize>,
}

fn default_poll_interval() -> u64 {
    12
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            batch_limit: None,
        }
    }
}

impl PollerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - TRIPNOW_POLL_INTERVAL_SECS: wait between cycles
    /// - TRIPNOW_POLL_BATCH_LIMIT: max reservations listed per cycle
    pub fn from_env() -> Self {
        Self {
            interval_secs: env_parse("TRIPNOW_POLL_INTERVAL_SECS").unwrap_or(default_poll_interval()),
            batch_limit: env_parse("TRIPNOW_POLL_BATCH_LIMIT"),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Effective listing limit
    pub fn limit(&self) -> usize {
        self.batch_limit.unwrap_or(usize::MAX)
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled data directory; empty selects the in-memory store
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./tripnow_data".to_string(),
        }
    }
}

impl StorageConfig {
    /// Load configuration from `TRIPNOW_DATA_DIR`
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("TRIPNOW_DATA_DIR").unwrap_or_else(|_| Self::default().data_dir),
        }
    }

    /// In-memory storage
    pub fn memory() -> Self {
        Self {
            data_dir: String::new(),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.data_dir.trim().is_empty()
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripNowConfig {
    pub risk: RiskConfig,
    pub poller: PollerConfig,
    pub storage: StorageConfig,
}

impl TripNowConfig {
    /// Load every section from the environment
    pub fn from_env() -> Self {
        Self {
            risk: RiskConfig::from_env(),
            poller: PollerConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }

    /// Local development: memory store, short poll interval
    pub fn development() -> Self {
        Self {
            risk: RiskConfig::default(),
            poller: PollerConfig {
                interval_secs: 5,
                batch_limit: None,
            },
            storage: StorageConfig::memory(),
        }
    }

    /// Tests: memory store, no backoff delay, one second intervals
    pub fn test() -> Self {
        Self {
            risk: RiskConfig {
                backoff_base_secs: 0,
                breaker_open_secs: 1,
                ..RiskConfig::default()
            },
            poller: PollerConfig {
                interval_secs: 1,
                batch_limit: None,
            },
            storage: StorageConfig::memory(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
