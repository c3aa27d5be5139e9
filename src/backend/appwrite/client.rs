//! Appwrite REST API Client
//!
//! Account calls act on behalf of a user through the `X-Appwrite-Session`
//! header. Document calls use the server API key and enforce ownership by
//! filtering on the `currentUser` attribute.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use super::document::{AppwriteErrorBody, DocumentList, InvoiceData, InvoiceDocument};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::types::{Session, User};
use crate::backend::{AccountService, InvoiceStore, CHANGE_FEED_CAPACITY};
use crate::config::AppwriteSettings;
use crate::invoice::{Invoice, InvoiceRecord, InvoiceStatus};
use crate::realtime::ChangeEvent;

/// Connection settings for an Appwrite project
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// API endpoint including `/v1` (e.g., "https://cloud.appwrite.io/v1")
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub invoices_collection_id: String,
    /// Server key with documents read/write and sessions write scopes
    pub api_key: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum documents fetched per list call
    pub list_limit: u32,
    /// Delay before the realtime listener reconnects
    pub reconnect_delay_secs: u64,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            database_id: String::new(),
            invoices_collection_id: String::new(),
            api_key: String::new(),
            request_timeout_ms: 10_000,
            list_limit: 5000,
            reconnect_delay_secs: 5,
        }
    }
}

impl From<&AppwriteSettings> for AppwriteConfig {
    fn from(settings: &AppwriteSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            database_id: settings.database_id.clone(),
            invoices_collection_id: settings.invoices_collection_id.clone(),
            api_key: settings.api_key.clone(),
            request_timeout_ms: settings.request_timeout_ms,
            list_limit: settings.list_limit,
            reconnect_delay_secs: settings.reconnect_delay_secs,
        }
    }
}

/// Appwrite REST client implementing both backend traits
pub struct AppwriteClient {
    client: Client,
    config: AppwriteConfig,
    changes: broadcast::Sender<ChangeEvent>,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl From<AccountBody> for User {
    fn from(body: AccountBody) -> Self {
        User {
            id: body.id,
            name: body.name,
            email: body.email,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    #[serde(rename = "$id")]
    id: String,
    user_id: String,
    #[serde(default)]
    secret: String,
    #[serde(default)]
    expire: Option<String>,
}

impl AppwriteClient {
    pub fn new(config: AppwriteConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(BackendError::Http)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        Ok(Self {
            client,
            config,
            changes,
        })
    }

    pub fn config(&self) -> &AppwriteConfig {
        &self.config
    }

    /// Sender of the change feed, shared with the realtime listener
    pub fn change_sender(&self) -> broadcast::Sender<ChangeEvent> {
        self.changes.clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.config.endpoint, path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Response-Format", "1.5.0")
    }

    /// Request authenticated with the server API key
    fn server_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .header("X-Appwrite-Key", &self.config.api_key)
    }

    /// Request on behalf of the user owning `token`
    fn session_request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.request(method, path).header("X-Appwrite-Session", token)
    }

    fn documents_path(&self) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            urlencoding::encode(&self.config.database_id),
            urlencoding::encode(&self.config.invoices_collection_id)
        )
    }

    fn document_path(&self, id: &str) -> String {
        format!("{}/{}", self.documents_path(), urlencoding::encode(id))
    }

    async fn execute(&self, builder: RequestBuilder) -> BackendResult<reqwest::Response> {
        let response = builder.send().await.map_err(BackendError::from_request)?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AppwriteErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        tracing::debug!(status = status.as_u16(), message = %message, "Appwrite error");
        Err(match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
            StatusCode::CONFLICT => BackendError::Conflict(message),
            _ => BackendError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BackendResult<T> {
        let response = self.execute(builder).await?;
        response.json::<T>().await.map_err(BackendError::Http)
    }

    /// Fetch a document and check it belongs to `owner`
    async fn owned_document(&self, owner: &str, id: &str) -> BackendResult<Invoice> {
        let builder = self.server_request(Method::GET, &self.document_path(id));
        let doc: InvoiceDocument = self
            .send_json(builder)
            .await
            .map_err(|e| not_found_as(e, id))?;
        let invoice = doc.into_invoice()?;
        if invoice.current_user != owner {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(invoice)
    }

    async fn patch_document(&self, invoice: &Invoice) -> BackendResult<Invoice> {
        let builder = self
            .server_request(Method::PATCH, &self.document_path(&invoice.id))
            .json(&json!({ "data": InvoiceData::from_invoice(invoice, false) }));
        let doc: InvoiceDocument = self
            .send_json(builder)
            .await
            .map_err(|e| not_found_as(e, &invoice.id))?;
        doc.into_invoice()
    }

    fn emit(&self, event: ChangeEvent) {
        let _ = self.changes.send(event);
    }
}

fn not_found_as(err: BackendError, id: &str) -> BackendError {
    match err {
        BackendError::Api { status: 404, .. } => BackendError::NotFound(id.to_string()),
        other => other,
    }
}

/// Query string entries, Appwrite 1.5 JSON query syntax
fn owner_queries(owner: &str, limit: u32) -> Vec<(&'static str, String)> {
    vec![
        (
            "queries[]",
            json!({ "method": "equal", "attribute": "currentUser", "values": [owner] }).to_string(),
        ),
        (
            "queries[]",
            json!({ "method": "orderAsc", "attribute": "$createdAt" }).to_string(),
        ),
        (
            "queries[]",
            json!({ "method": "limit", "values": [limit] }).to_string(),
        ),
    ]
}

#[async_trait]
impl AccountService for AppwriteClient {
    async fn create_account(&self, email: &str, password: &str, name: &str) -> BackendResult<User> {
        let builder = self.request(Method::POST, "/account").json(&json!({
            "userId": "unique()",
            "email": email,
            "password": password,
            "name": name,
        }));
        let body: AccountBody = self.send_json(builder).await?;
        tracing::info!(user_id = %body.id, "Appwrite account created");
        Ok(body.into())
    }

    async fn create_session(&self, email: &str, password: &str) -> BackendResult<Session> {
        // The server key makes Appwrite return the session secret
        let builder = self
            .server_request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }));
        let body: SessionBody = self.send_json(builder).await?;

        if body.secret.is_empty() {
            return Err(BackendError::Api {
                status: 500,
                message: "Session secret missing; the API key needs the sessions.write scope"
                    .to_string(),
            });
        }

        Ok(Session {
            id: body.id,
            user_id: body.user_id,
            token: body.secret,
            expires_at: body.expire,
        })
    }

    async fn delete_session(&self, token: &str) -> BackendResult<()> {
        let builder = self.session_request(Method::DELETE, "/account/sessions/current", token);
        self.execute(builder).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> BackendResult<User> {
        let builder = self.session_request(Method::GET, "/account", token);
        let body: AccountBody = self.send_json(builder).await?;
        Ok(body.into())
    }
}

#[async_trait]
impl InvoiceStore for AppwriteClient {
    async fn create(&self, owner: &str, record: &InvoiceRecord) -> BackendResult<Invoice> {
        let draft = Invoice::from_record("", owner, record, Utc::now());
        let builder = self
            .server_request(Method::POST, &self.documents_path())
            .json(&json!({
                "documentId": "unique()",
                "data": InvoiceData::from_invoice(&draft, true),
            }));
        let doc: InvoiceDocument = self.send_json(builder).await?;
        let invoice = doc.into_invoice()?;

        tracing::info!(invoice_id = %invoice.id, owner = %owner, "Invoice created");
        self.emit(ChangeEvent::created(invoice.clone()));
        Ok(invoice)
    }

    async fn list(&self, owner: &str) -> BackendResult<Vec<Invoice>> {
        let builder = self
            .server_request(Method::GET, &self.documents_path())
            .query(&owner_queries(owner, self.config.list_limit));
        let list: DocumentList = self.send_json(builder).await?;

        if list.total > list.documents.len() as u64 {
            tracing::warn!(
                total = list.total,
                fetched = list.documents.len(),
                "Invoice list truncated by list_limit"
            );
        }

        list.documents
            .into_iter()
            .map(InvoiceDocument::into_invoice)
            .collect()
    }

    async fn get(&self, owner: &str, id: &str) -> BackendResult<Invoice> {
        self.owned_document(owner, id).await
    }

    async fn update(&self, owner: &str, id: &str, record: &InvoiceRecord) -> BackendResult<Invoice> {
        let mut invoice = self.owned_document(owner, id).await?;
        invoice.apply_record(record, Utc::now());
        let invoice = self.patch_document(&invoice).await?;

        tracing::info!(invoice_id = %id, "Invoice updated");
        self.emit(ChangeEvent::updated(invoice.clone()));
        Ok(invoice)
    }

    async fn set_status(&self, owner: &str, id: &str, status: InvoiceStatus) -> BackendResult<Invoice> {
        let mut invoice = self.owned_document(owner, id).await?;
        invoice.status = status;
        invoice.recompute();
        invoice.updated_at = Some(Utc::now());
        let invoice = self.patch_document(&invoice).await?;

        tracing::info!(invoice_id = %id, status = %status, "Invoice status changed");
        self.emit(ChangeEvent::updated(invoice.clone()));
        Ok(invoice)
    }

    async fn delete(&self, owner: &str, id: &str) -> BackendResult<()> {
        self.owned_document(owner, id).await?;
        let builder = self.server_request(Method::DELETE, &self.document_path(id));
        self.execute(builder)
            .await
            .map_err(|e| not_found_as(e, id))?;

        tracing::info!(invoice_id = %id, "Invoice deleted");
        self.emit(ChangeEvent::deleted(owner, id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> BackendResult<()> {
        let builder = self
            .server_request(Method::GET, &self.documents_path())
            .query(&[(
                "queries[]",
                json!({ "method": "limit", "values": [1] }).to_string(),
            )]);
        self.execute(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AppwriteClient {
        AppwriteClient::new(AppwriteConfig {
            project_id: "proj".to_string(),
            database_id: "main db".to_string(),
            invoices_collection_id: "invoices".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_document_paths_are_encoded() {
        let client = client();
        assert_eq!(
            client.documents_path(),
            "/databases/main%20db/collections/invoices/documents"
        );
        assert_eq!(
            client.document_path("a/b"),
            "/databases/main%20db/collections/invoices/documents/a%2Fb"
        );
    }

    #[test]
    fn test_owner_queries() {
        let queries = owner_queries("user-1", 100);
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|(k, _)| *k == "queries[]"));

        let equal: serde_json::Value = serde_json::from_str(&queries[0].1).unwrap();
        assert_eq!(equal["method"], "equal");
        assert_eq!(equal["attribute"], "currentUser");
        assert_eq!(equal["values"][0], "user-1");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = not_found_as(
            BackendError::Api {
                status: 404,
                message: "Document with the requested ID could not be found.".to_string(),
            },
            "inv-1",
        );
        assert!(matches!(err, BackendError::NotFound(id) if id == "inv-1"));

        let err = not_found_as(BackendError::Timeout, "inv-1");
        assert!(matches!(err, BackendError::Timeout));
    }

    #[test]
    fn test_config_from_settings_trims_endpoint() {
        let settings = AppwriteSettings {
            endpoint: "https://cloud.appwrite.io/v1/".to_string(),
            ..Default::default()
        };
        let config = AppwriteConfig::from(&settings);
        assert_eq!(config.endpoint, "https://cloud.appwrite.io/v1");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let client = AppwriteClient::new(AppwriteConfig {
            endpoint: "http://127.0.0.1:9/v1".to_string(),
            request_timeout_ms: 2000,
            ..Default::default()
        })
        .unwrap();

        let err = client.current_user("token").await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable | BackendError::Timeout));
    }
}
