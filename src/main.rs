mod api;
mod carrier;
mod config;
mod error;
mod mapper;
mod models;
mod notify;
mod observability;
mod state;
mod store;
mod sync;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::carrier::BringClient;
use crate::notify::transport::HttpMailer;
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let carrier = BringClient::new(
        config.carrier_base_url.clone(),
        config.carrier_api_key.clone(),
        Duration::from_secs(config.carrier_timeout_secs),
    )
    .map_err(|err| error::AppError::Internal(format!("carrier client: {err}")))?;

    let mailer = HttpMailer::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
        Duration::from_secs(config.mail_timeout_secs),
    )
    .map_err(|err| error::AppError::Internal(format!("mail transport: {err}")))?;

    let app_state = Arc::new(state::AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(carrier),
        Arc::new(mailer),
        config.allow_status_regression,
        Duration::from_millis(config.sync_delay_ms),
    ));

    if config.sync_interval_secs > 0 {
        tokio::spawn(sync::scheduler::run_scheduler(
            app_state.orchestrator.clone(),
            Duration::from_secs(config.sync_interval_secs),
        ));
    }

    let app = api::rest::router(app_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
