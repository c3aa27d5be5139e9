//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::auth::AuthService;
use crate::backend::{Backend, InvoiceStore};
use crate::config::{BackendKind, Config};
use crate::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;
use std::time::Instant;

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Signup, login and session checks
    pub auth: AuthService,
    /// Owner-partitioned invoice collection
    pub invoices: Arc<dyn InvoiceStore>,
    /// Which backend is serving requests
    pub backend_kind: BackendKind,
    /// Full configuration (API, dashboard settings)
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for live invoice updates
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(backend: &Backend, config: Config) -> Self {
        let hub_config = HubConfig {
            max_connections: config.api.max_ws_connections,
        };
        Self {
            auth: AuthService::new(backend.accounts.clone()),
            invoices: backend.invoices.clone(),
            backend_kind: backend.kind,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
