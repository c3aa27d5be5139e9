//! # Maglo
//!
//! Invoicing dashboard server. Accounts, sessions and invoices live in a
//! hosted backend-as-a-service (Appwrite); this crate validates input,
//! derives VAT and totals, aggregates the dashboard and pushes live updates.
//!
//! ## Modules
//!
//! - [`invoice`]: invoice model, VAT arithmetic, validation, filtering, CSV
//! - [`dashboard`]: overview metrics, chart buckets, recent list, formatting
//! - [`backend`]: account and invoice store seam (Appwrite, local SQLite)
//! - [`auth`]: signup, login, logout and session checks
//! - [`realtime`]: change events and list merging
//! - [`websocket`]: live invoice feed to connected dashboards
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use maglo::backend::{Backend, LocalBackend};
//! use maglo::invoice::InvoiceInput;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Backend::local(Arc::new(LocalBackend::in_memory()?));
//!     let auth = maglo::auth::AuthService::new(backend.accounts.clone());
//!
//!     let (_session, user) = auth.signup("Ada Obi", "ada@example.com", "password123").await?;
//!
//!     let record = InvoiceInput {
//!         client_name: "Acme".to_string(),
//!         client_email: "billing@acme.test".to_string(),
//!         amount: 200.0,
//!         vat_percentage: 7.5,
//!         due_date: chrono::NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
//!         status: Default::default(),
//!     }
//!     .validate()?;
//!
//!     let invoice = backend.invoices.create(&user.id, &record).await?;
//!     println!("Created {} for {}", invoice.id, invoice.total);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod invoice;
pub mod realtime;
pub mod websocket;

// Re-export top-level types for convenience
pub use invoice::{
    Invoice, InvoiceError, InvoiceInput, InvoiceRecord, InvoiceStatus, StatusCounts, StatusFilter,
};

pub use dashboard::{ChartBucket, MetricCard, Overview};

pub use backend::{
    AccountService, Backend, BackendError, BackendResult, InvoiceStore, LocalBackend, Session,
    User,
};

pub use auth::{AuthError, AuthService};

pub use realtime::{apply_change, ChangeEvent, ChangeKind};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{Config, ConfigError, LoggingConfig};
