//! Maglo API Server
//!
//! Run with: cargo run --bin maglo
//!
//! # Configuration
//!
//! Read from `config.toml` in the user config dir, `/etc/maglo/` or the
//! working directory, with `MAGLO_*` environment overrides. `RUST_LOG`
//! takes precedence over the configured log level.

use maglo::api::{serve, AppState};
use maglo::backend::Backend;
use maglo::config::{Config, LoggingConfig};
use maglo::realtime::spawn_forwarder;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Maglo API server v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    tracing::info!(backend = %config.backend.kind, "Connecting backend");
    let backend = Backend::from_config(&config)?;

    match backend.invoices.ping().await {
        Ok(()) => tracing::info!("Backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Backend not reachable yet (readiness will report it)"),
    }

    let api_config = config.api.clone();
    let state = AppState::new(&backend, config);

    // Push backend changes to connected dashboards
    let forwarder = spawn_forwarder(backend.invoices.subscribe(), Arc::clone(&state.ws_hub));
    let listener = backend.realtime.as_ref().map(|listener| {
        tracing::info!(channel = %listener.channel(), "Starting Appwrite realtime listener");
        listener.spawn()
    });

    // Run server
    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    forwarder.abort();
    if let Some(handle) = listener {
        handle.abort();
    }
    tracing::info!("Maglo API server stopped");

    Ok(())
}

/// Install the global subscriber: `pretty` or `json` output
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("maglo={},tower_http=info", logging.level).into());

    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
