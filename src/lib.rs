pub mod analysis; // prompt → provider → parsed, sorted report
pub mod config;
pub mod core_state;
pub mod flow; // consent → form → loading → results
pub mod models;
pub mod web;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::analysis::{AnalysisError, AnalysisGateway};
use crate::config::{AppConfig, ConfigError};
use crate::core_state::CoreState;
use crate::web::ServerError;

/// Fatal errors before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cannot create analysis gateway: {0}")]
    Gateway(#[from] AnalysisError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

pub async fn run() -> Result<(), StartupError> {
    // A missing .env file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.gateway.model,
        timeout_secs = config.gateway.timeout_secs,
        max_retries = config.gateway.max_retries,
        "Configuration loaded"
    );

    let gateway = AnalysisGateway::from_config(&config.gateway)?;
    tracing::info!(provider = gateway.provider_name(), "Analysis gateway ready");
    let core = Arc::new(CoreState::new(gateway));

    let server = web::start_server(core, config.addr).await?;
    tracing::info!("Open http://{} in your browser", server.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("Shutting down");
    server.shutdown().await;
    Ok(())
}
