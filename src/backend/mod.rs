//! Backend-as-a-service seam
//!
//! Accounts, sessions and the invoice collection live in an external service.
//! The server only talks to it through two traits:
//!
//! - [`AccountService`]: account creation, password sessions, current user
//! - [`InvoiceStore`]: the owner-partitioned invoice collection and its change feed
//!
//! Implementations:
//!
//! - **appwrite**: the hosted Appwrite REST API plus its realtime socket
//! - **local**: an SQLite stand-in for development and tests

pub mod appwrite;
pub mod error;
pub mod local;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::{BackendKind, Config};
use crate::invoice::{Invoice, InvoiceRecord, InvoiceStatus};
use crate::realtime::ChangeEvent;

pub use appwrite::{AppwriteClient, AppwriteConfig, RealtimeListener};
pub use error::{BackendError, BackendResult};
pub use local::LocalBackend;
pub use types::{Session, User};

/// Hosted account and session API
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account; does not log in
    async fn create_account(&self, email: &str, password: &str, name: &str) -> BackendResult<User>;

    /// Start an email/password session
    async fn create_session(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// End the session identified by `token`
    async fn delete_session(&self, token: &str) -> BackendResult<()>;

    /// Account behind a session token
    async fn current_user(&self, token: &str) -> BackendResult<User>;
}

/// The invoice collection, partitioned by owner
///
/// Ids owned by another user behave as missing.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn create(&self, owner: &str, record: &InvoiceRecord) -> BackendResult<Invoice>;

    /// All invoices of `owner`, oldest first
    async fn list(&self, owner: &str) -> BackendResult<Vec<Invoice>>;

    async fn get(&self, owner: &str, id: &str) -> BackendResult<Invoice>;

    /// Overwrite every editable field
    async fn update(&self, owner: &str, id: &str, record: &InvoiceRecord) -> BackendResult<Invoice>;

    async fn set_status(&self, owner: &str, id: &str, status: InvoiceStatus) -> BackendResult<Invoice>;

    async fn delete(&self, owner: &str, id: &str) -> BackendResult<()>;

    /// Receive every subsequent create, update and delete
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;

    /// Cheap reachability check for readiness probes
    async fn ping(&self) -> BackendResult<()>;
}

/// Capacity of the change feed channel
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// The pair of services the server runs against
#[derive(Clone)]
pub struct Backend {
    pub accounts: Arc<dyn AccountService>,
    pub invoices: Arc<dyn InvoiceStore>,
    /// Background listener on the hosted realtime channel, if any
    pub realtime: Option<Arc<RealtimeListener>>,
    pub kind: BackendKind,
}

impl Backend {
    /// Build the backend selected in the configuration
    pub fn from_config(config: &Config) -> BackendResult<Self> {
        match config.backend.kind {
            BackendKind::Appwrite => {
                let appwrite = AppwriteConfig::from(&config.appwrite);
                let client = Arc::new(AppwriteClient::new(appwrite.clone())?);
                let realtime = config.appwrite.realtime_enabled.then(|| {
                    Arc::new(RealtimeListener::new(appwrite, client.change_sender()))
                });
                Ok(Self {
                    accounts: client.clone(),
                    invoices: client,
                    realtime,
                    kind: BackendKind::Appwrite,
                })
            }
            BackendKind::Local => {
                let local = Arc::new(if config.local.in_memory {
                    LocalBackend::in_memory()?
                } else {
                    LocalBackend::open(config.local.database_path())?
                });
                Ok(Self::local(local))
            }
        }
    }

    /// Wrap a local backend
    pub fn local(local: Arc<LocalBackend>) -> Self {
        Self {
            accounts: local.clone(),
            invoices: local,
            realtime: None,
            kind: BackendKind::Local,
        }
    }
}
