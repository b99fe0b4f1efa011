//! Application state for the API server

use std::env;
use std::sync::Arc;

use tripnow_risk::ResilientRiskClient;
use tripnow_store::ReservationStore;
use tripnow_worker::PollerMetrics;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Reservation store
    pub store: Arc<dyn ReservationStore>,
    /// Risk client shared with the poller, for health and metrics
    pub risk_client: Option<Arc<ResilientRiskClient>>,
    /// Metrics of the poller running in this process
    pub poller_metrics: Option<Arc<PollerMetrics>>,
    /// API version
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self {
            store,
            risk_client: None,
            poller_metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_risk_client(mut self, client: Arc<ResilientRiskClient>) -> Self {
        self.risk_client = Some(client);
        self
    }

    pub fn with_poller_metrics(mut self, metrics: Arc<PollerMetrics>) -> Self {
        self.poller_metrics = Some(metrics);
        self
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - TRIPNOW_API_HOST: bind address
    /// - TRIPNOW_API_PORT: bind port
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("TRIPNOW_API_HOST").unwrap_or(defaults.host),
            port: env::var("TRIPNOW_API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: defaults.enable_cors,
        }
    }
}
