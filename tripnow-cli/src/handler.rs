//! Command Handlers

use std::sync::Arc;
use tracing::info;

use tripnow_api::{run_server, ApiConfig, AppState};
use tripnow_core::{RiskEvaluationOutcome, StorageConfig, TripNowConfig};
use tripnow_risk::ResilientRiskClient;
use tripnow_store::{MemoryReservationStore, ReservationStore, SledReservationStore};
use tripnow_worker::{CycleReport, RiskPoller};

use crate::commands::{Cli, Commands};
use crate::error::{CliError, CliResult};

/// Store selected by the storage configuration
pub enum StoreBackend {
    Memory(Arc<MemoryReservationStore>),
    Sled(Arc<SledReservationStore>),
}

impl StoreBackend {
    pub fn open(config: &StorageConfig) -> CliResult<Self> {
        if config.is_memory() {
            info!("Using in-memory reservation store");
            return Ok(Self::Memory(Arc::new(MemoryReservationStore::new())));
        }

        info!(data_dir = %config.data_dir, "Opening sled reservation store");
        Ok(Self::Sled(Arc::new(SledReservationStore::new(config)?)))
    }

    pub fn shared(&self) -> Arc<dyn ReservationStore> {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Sled(store) => store.clone(),
        }
    }

    pub async fn flush(&self) -> CliResult<()> {
        if let Self::Sled(store) = self {
            store.flush().await?;
        }
        Ok(())
    }
}

/// Environment configuration with command-line overrides applied
pub fn load_config(cli: &Cli) -> TripNowConfig {
    let mut config = TripNowConfig::from_env();

    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(url) = &cli.risk_url {
        config.risk.url = url.clone();
    }
    if let Commands::Serve {
        poll_interval: Some(secs),
        ..
    } = &cli.command
    {
        config.poller.interval_secs = *secs;
    }

    config
}

/// Reject settings the pipeline cannot run with
pub fn check_config(config: &TripNowConfig) -> CliResult<()> {
    if config.risk.url.trim().is_empty() {
        return Err(CliError::config("risk oracle URL is empty"));
    }
    if config.poller.interval_secs == 0 {
        return Err(CliError::config("poll interval must be at least one second"));
    }
    if config.poller.batch_limit == Some(0) {
        return Err(CliError::config("poll batch limit must be positive"));
    }
    Ok(())
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli);
    check_config(&config)?;

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let mut api_config = ApiConfig::from_env();
            if let Some(host) = host {
                api_config.host = host;
            }
            if let Some(port) = port {
                api_config.port = port;
            }
            serve(&config, &api_config).await
        }
        Commands::Evaluate {
            email,
            country,
            amount,
        } => {
            let outcome = evaluate(&config, &email, &country, amount).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::PollOnce => {
            let report = poll_once(&config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Run API server and poller until Ctrl-C
pub async fn serve(config: &TripNowConfig, api_config: &ApiConfig) -> CliResult<()> {
    let backend = StoreBackend::open(&config.storage)?;
    let store = backend.shared();
    let client = Arc::new(ResilientRiskClient::from_config(&config.risk));

    let poller = RiskPoller::new(store.clone(), client.clone(), config.poller.clone());
    let state = AppState::new(store)
        .with_risk_client(client)
        .with_poller_metrics(poller.metrics());
    let poller = poller.start();

    info!(risk_url = %config.risk.url, "TripNow started");

    let served = run_server(api_config, state, shutdown_signal())
        .await
        .map_err(|e| CliError::server(e.to_string()));

    poller.stop().await;
    backend.flush().await?;
    served
}

/// One resilient risk evaluation
pub async fn evaluate(
    config: &TripNowConfig,
    email: &str,
    country: &str,
    amount: i64,
) -> RiskEvaluationOutcome {
    let client = ResilientRiskClient::from_config(&config.risk);
    client.evaluate(email, country, amount).await
}

/// One poll cycle over the configured store
pub async fn poll_once(config: &TripNowConfig) -> CliResult<CycleReport> {
    let backend = StoreBackend::open(&config.storage)?;
    let client = Arc::new(ResilientRiskClient::from_config(&config.risk));
    let poller = RiskPoller::new(backend.shared(), client, config.poller.clone());

    let report = poller.run_cycle().await?;
    backend.flush().await?;
    Ok(report)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
