//! SQLite stand-in for the hosted backend
//!
//! Used for development and tests. Accounts carry Argon2 password hashes,
//! sessions are opaque random tokens, and invoices are partitioned by owner.
//! There is no email verification, session expiry or permission model.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{BackendError, BackendResult};
use super::types::{Session, User};
use super::{AccountService, InvoiceStore, CHANGE_FEED_CAPACITY};
use crate::invoice::{Invoice, InvoiceRecord, InvoiceStatus};
use crate::realtime::ChangeEvent;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_accounts",
        "CREATE TABLE accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE sessions (
            token TEXT PRIMARY KEY,
            id TEXT NOT NULL,
            user_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        );",
    ),
    (
        "002_create_invoices",
        "CREATE TABLE invoices (
            id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            client_name TEXT NOT NULL,
            client_email TEXT NOT NULL,
            amount REAL NOT NULL,
            vat_percentage REAL NOT NULL,
            vat_amount REAL NOT NULL,
            total REAL NOT NULL,
            due_date TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX idx_invoices_owner ON invoices(owner);",
    ),
];

const INVOICE_COLUMNS: &str = "id, owner, client_name, client_email, amount, vat_percentage,
    vat_amount, total, due_date, status, created_at, updated_at";

/// Local SQLite backend
pub struct LocalBackend {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl LocalBackend {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BackendError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tracing::info!(path = %path.display(), "Opening local backend");
        Self::with_connection(Connection::open(path)?)
    }

    /// Database that lives for the lifetime of the process
    pub fn in_memory() -> BackendResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> BackendResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        run_migrations(&mut conn)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    fn conn(&self) -> BackendResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BackendError::Storage("connection lock poisoned".to_string()))
    }

    fn emit(&self, event: ChangeEvent) {
        // No receivers is fine
        let _ = self.changes.send(event);
    }

    fn fetch(&self, conn: &Connection, owner: &str, id: &str) -> BackendResult<Invoice> {
        let sql = format!(
            "SELECT {} FROM invoices WHERE id = ?1 AND owner = ?2",
            INVOICE_COLUMNS
        );
        let row = conn
            .query_row(&sql, params![id, owner], InvoiceRow::from_row)
            .optional()?
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        row.into_invoice()
    }

    fn write(&self, conn: &Connection, invoice: &Invoice) -> BackendResult<()> {
        conn.execute(
            "UPDATE invoices SET client_name = ?1, client_email = ?2, amount = ?3,
                vat_percentage = ?4, vat_amount = ?5, total = ?6, due_date = ?7,
                status = ?8, updated_at = ?9
             WHERE id = ?10 AND owner = ?11",
            params![
                invoice.client_name,
                invoice.client_email,
                invoice.amount,
                invoice.vat_percentage,
                invoice.vat_amount,
                invoice.total,
                invoice.due_date.to_string(),
                invoice.status.to_string(),
                timestamp(invoice.updated_at.unwrap_or_else(Utc::now)),
                invoice.id,
                invoice.current_user,
            ],
        )?;
        Ok(())
    }
}

fn run_migrations(conn: &mut Connection) -> BackendResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<String> = conn
            .query_row(
                "SELECT name FROM schema_migrations WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if applied.is_none() {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                params![name],
            )?;
            tx.commit()?;
            tracing::debug!(migration = %name, "Applied migration");
        }
    }

    Ok(())
}

/// Current time at the precision the invoice table stores
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn hash_password(password: &str) -> BackendResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackendError::Storage(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Runs Argon2 on the blocking pool
async fn hash_password_blocking(password: &str) -> BackendResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BackendError::Storage(format!("password hashing task failed: {}", e)))?
}

async fn verify_password_blocking(password: &str, stored: String) -> BackendResult<bool> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| BackendError::Storage(format!("password check task failed: {}", e)))
}

/// Raw column values of an invoice row
struct InvoiceRow {
    id: String,
    owner: String,
    client_name: String,
    client_email: String,
    amount: f64,
    vat_percentage: f64,
    vat_amount: f64,
    total: f64,
    due_date: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl InvoiceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            client_name: row.get(2)?,
            client_email: row.get(3)?,
            amount: row.get(4)?,
            vat_percentage: row.get(5)?,
            vat_amount: row.get(6)?,
            total: row.get(7)?,
            due_date: row.get(8)?,
            status: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn into_invoice(self) -> BackendResult<Invoice> {
        let due_date = NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d")
            .map_err(|e| BackendError::Serialization(format!("due_date '{}': {}", self.due_date, e)))?;
        let status = self
            .status
            .parse::<InvoiceStatus>()
            .map_err(|e| BackendError::Serialization(e.to_string()))?;

        Ok(Invoice {
            id: self.id,
            client_name: self.client_name,
            client_email: self.client_email,
            amount: self.amount,
            vat_percentage: self.vat_percentage,
            vat_amount: self.vat_amount,
            total: self.total,
            due_date,
            status,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
            current_user: self.owner,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl AccountService for LocalBackend {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> BackendResult<User> {
        let email = email.trim().to_lowercase();
        let password_hash = hash_password_blocking(password).await?;
        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            email,
        };

        let conn = self.conn()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM accounts WHERE email = ?1",
                params![user.email],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(BackendError::Conflict(
                "A user with the same email already exists".to_string(),
            ));
        }

        conn.execute(
            "INSERT INTO accounts (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.id, user.name, user.email, password_hash, timestamp(Utc::now())],
        )?;

        tracing::info!(user_id = %user.id, "Account created");
        Ok(user)
    }

    async fn create_session(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim().to_lowercase();

        let account: Option<(String, String)> = self
            .conn()?
            .query_row(
                "SELECT id, password_hash FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let verified = match account {
            Some((id, hash)) => verify_password_blocking(password, hash).await?.then_some(id),
            None => None,
        };
        let user_id = verified.ok_or_else(|| {
            BackendError::Unauthorized(
                "Invalid credentials. Please check the email and password.".to_string(),
            )
        })?;

        let session = Session {
            id: new_id(),
            user_id,
            token: format!("{}{}", new_id(), new_id()),
            expires_at: None,
        };
        self.conn()?.execute(
            "INSERT INTO sessions (token, id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![session.token, session.id, session.user_id, timestamp(Utc::now())],
        )?;

        tracing::debug!(user_id = %session.user_id, "Session created");
        Ok(session)
    }

    async fn delete_session(&self, token: &str) -> BackendResult<()> {
        let removed = self
            .conn()?
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        if removed == 0 {
            return Err(BackendError::Unauthorized("Session not found".to_string()));
        }
        Ok(())
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        self.conn()?
            .query_row(
                "SELECT a.id, a.name, a.email FROM sessions s
                 JOIN accounts a ON a.id = s.user_id
                 WHERE s.token = ?1",
                params![token],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| BackendError::Unauthorized("No active session".to_string()))
    }
}

#[async_trait]
impl InvoiceStore for LocalBackend {
    async fn create(&self, owner: &str, record: &InvoiceRecord) -> BackendResult<Invoice> {
        let invoice = Invoice::from_record(new_id(), owner, record, now());
        let created_at = timestamp(invoice.created_at.unwrap_or_else(now));

        self.conn()?.execute(
            &format!(
                "INSERT INTO invoices ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                INVOICE_COLUMNS
            ),
            params![
                invoice.id,
                invoice.current_user,
                invoice.client_name,
                invoice.client_email,
                invoice.amount,
                invoice.vat_percentage,
                invoice.vat_amount,
                invoice.total,
                invoice.due_date.to_string(),
                invoice.status.to_string(),
                created_at,
                created_at,
            ],
        )?;

        tracing::info!(invoice_id = %invoice.id, owner = %owner, "Invoice created");
        self.emit(ChangeEvent::created(invoice.clone()));
        Ok(invoice)
    }

    async fn list(&self, owner: &str) -> BackendResult<Vec<Invoice>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM invoices WHERE owner = ?1 ORDER BY created_at ASC, rowid ASC",
            INVOICE_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![owner], InvoiceRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(InvoiceRow::into_invoice).collect()
    }

    async fn get(&self, owner: &str, id: &str) -> BackendResult<Invoice> {
        let conn = self.conn()?;
        self.fetch(&conn, owner, id)
    }

    async fn update(&self, owner: &str, id: &str, record: &InvoiceRecord) -> BackendResult<Invoice> {
        let invoice = {
            let conn = self.conn()?;
            let mut invoice = self.fetch(&conn, owner, id)?;
            invoice.apply_record(record, now());
            self.write(&conn, &invoice)?;
            invoice
        };

        tracing::info!(invoice_id = %id, "Invoice updated");
        self.emit(ChangeEvent::updated(invoice.clone()));
        Ok(invoice)
    }

    async fn set_status(&self, owner: &str, id: &str, status: InvoiceStatus) -> BackendResult<Invoice> {
        let invoice = {
            let conn = self.conn()?;
            let mut invoice = self.fetch(&conn, owner, id)?;
            invoice.status = status;
            invoice.recompute();
            invoice.updated_at = Some(now());
            self.write(&conn, &invoice)?;
            invoice
        };

        tracing::info!(invoice_id = %id, status = %status, "Invoice status changed");
        self.emit(ChangeEvent::updated(invoice.clone()));
        Ok(invoice)
    }

    async fn delete(&self, owner: &str, id: &str) -> BackendResult<()> {
        let removed = self.conn()?.execute(
            "DELETE FROM invoices WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        if removed == 0 {
            return Err(BackendError::NotFound(id.to_string()));
        }

        tracing::info!(invoice_id = %id, "Invoice deleted");
        self.emit(ChangeEvent::deleted(owner, id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> BackendResult<()> {
        self.conn()?.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceInput;
    use crate::realtime::ChangeKind;

    fn record(name: &str, amount: f64) -> InvoiceRecord {
        InvoiceInput {
            client_name: name.to_string(),
            client_email: "client@example.com".to_string(),
            amount,
            vat_percentage: 7.5,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            status: InvoiceStatus::Unpaid,
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_signup_login_and_current_user() {
        let backend = LocalBackend::in_memory().unwrap();
        let user = backend
            .create_account("Ada@Example.com", "password123", "Ada")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        let session = backend
            .create_session("ada@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(backend.current_user(&session.token).await.unwrap(), user);

        backend.delete_session(&session.token).await.unwrap();
        assert!(backend.current_user(&session.token).await.is_err());
        assert!(backend.delete_session(&session.token).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let backend = LocalBackend::in_memory().unwrap();
        backend.create_account("a@b.co", "password123", "A").await.unwrap();
        let err = backend
            .create_account("A@B.co", "password456", "B")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_unauthorized() {
        let backend = LocalBackend::in_memory().unwrap();
        backend.create_account("a@b.co", "password123", "A").await.unwrap();
        let err = backend.create_session("a@b.co", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
        let err = backend.create_session("nobody@b.co", "password123").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_invoice_crud_and_ownership() {
        let backend = LocalBackend::in_memory().unwrap();

        let created = backend.create("alice", &record("Ada", 1000.0)).await.unwrap();
        assert_eq!(created.vat_amount, 75.0);
        assert_eq!(created.total, 1075.0);
        assert!(created.created_at.is_some());

        backend.create("bob", &record("Bayo", 50.0)).await.unwrap();
        assert_eq!(backend.list("alice").await.unwrap().len(), 1);

        // bob cannot see or touch alice's invoice
        assert!(matches!(
            backend.get("bob", &created.id).await,
            Err(BackendError::NotFound(_))
        ));
        assert!(backend.delete("bob", &created.id).await.is_err());

        let updated = backend
            .update("alice", &created.id, &record("Ada Obi", 2000.0))
            .await
            .unwrap();
        assert_eq!(updated.client_name, "Ada Obi");
        assert_eq!(updated.total, 2150.0);
        assert_eq!(updated.created_at, created.created_at);

        let stored = backend.get("alice", &created.id).await.unwrap();
        assert_eq!(stored.created_at, created.created_at);
        assert_eq!(stored.updated_at, updated.updated_at);

        let paid = backend
            .set_status("alice", &created.id, InvoiceStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(backend.get("alice", &created.id).await.unwrap().status, InvoiceStatus::Paid);

        backend.delete("alice", &created.id).await.unwrap();
        assert!(backend.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_oldest_first() {
        let backend = LocalBackend::in_memory().unwrap();
        for name in ["First", "Second", "Third"] {
            backend.create("alice", &record(name, 1.0)).await.unwrap();
        }
        let names: Vec<String> = backend
            .list("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|inv| inv.client_name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_writes_emit_change_events() {
        let backend = LocalBackend::in_memory().unwrap();
        let mut rx = backend.subscribe();

        let inv = backend.create("alice", &record("Ada", 10.0)).await.unwrap();
        backend
            .set_status("alice", &inv.id, InvoiceStatus::Paid)
            .await
            .unwrap();
        backend.delete("alice", &inv.id).await.unwrap();

        let kinds: Vec<ChangeKind> = (0..3).map(|_| rx.try_recv().unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![ChangeKind::Created, ChangeKind::Updated, ChangeKind::Deleted]
        );
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("maglo.db");

        {
            let backend = LocalBackend::open(&path).unwrap();
            backend.create("alice", &record("Ada", 10.0)).await.unwrap();
        }

        let reopened = LocalBackend::open(&path).unwrap();
        assert_eq!(reopened.list("alice").await.unwrap().len(), 1);
        reopened.ping().await.unwrap();
    }
}
