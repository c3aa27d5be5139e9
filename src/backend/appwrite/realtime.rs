//! Appwrite realtime listener
//!
//! Keeps a WebSocket open on the invoices collection channel and turns
//! document events into [`ChangeEvent`]s on the backend change feed. Events
//! for writes made through this server arrive twice (once from the client,
//! once from here); `apply_change` makes that harmless.
//!
//! Only documents readable by the connecting role are delivered, so the
//! collection permissions decide what this listener sees.

use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::client::AppwriteConfig;
use super::document::InvoiceDocument;
use crate::realtime::ChangeEvent;

/// Background listener on the collection channel
pub struct RealtimeListener {
    config: AppwriteConfig,
    changes: broadcast::Sender<ChangeEvent>,
}

#[derive(Debug, Deserialize)]
struct RealtimeFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RealtimeEvent {
    #[serde(default)]
    events: Vec<String>,
    payload: serde_json::Value,
}

impl RealtimeListener {
    pub fn new(config: AppwriteConfig, changes: broadcast::Sender<ChangeEvent>) -> Self {
        Self { config, changes }
    }

    /// Channel name of the invoices collection
    pub fn channel(&self) -> String {
        format!(
            "databases.{}.collections.{}.documents",
            self.config.database_id, self.config.invoices_collection_id
        )
    }

    /// `wss://…/v1/realtime?project=…&channels[]=…`
    pub fn url(&self) -> String {
        let base = if let Some(rest) = self.config.endpoint.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.config.endpoint.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.config.endpoint.clone()
        };
        format!(
            "{}/realtime?project={}&{}={}",
            base,
            urlencoding::encode(&self.config.project_id),
            urlencoding::encode("channels[]"),
            urlencoding::encode(&self.channel())
        )
    }

    /// Run until the task is aborted, reconnecting after a fixed delay
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let listener = Arc::clone(self);
        tokio::spawn(async move {
            let delay = Duration::from_secs(listener.config.reconnect_delay_secs.max(1));
            loop {
                match listener.run_once().await {
                    Ok(()) => tracing::info!("Appwrite realtime connection closed"),
                    Err(e) => tracing::warn!(error = %e, "Appwrite realtime connection lost"),
                }
                tokio::time::sleep(delay).await;
            }
        })
    }

    async fn run_once(&self) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        let url = self.url();
        let (stream, _) = connect_async(url.as_str()).await?;
        tracing::info!(channel = %self.channel(), "Appwrite realtime connected");

        let (_write, mut read) = stream.split();
        while let Some(message) = read.next().await {
            match message? {
                Message::Text(text) => {
                    if let Some(event) = parse_realtime_message(&text) {
                        tracing::debug!(
                            kind = ?event.kind,
                            invoice_id = %event.invoice_id,
                            "Appwrite realtime event"
                        );
                        let _ = self.changes.send(event);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Turn one realtime frame into a change event
///
/// Returns `None` for `connected`, `error` and unrelated frames, and for
/// payloads that are not invoice documents.
pub fn parse_realtime_message(text: &str) -> Option<ChangeEvent> {
    let frame: RealtimeFrame = serde_json::from_str(text).ok()?;
    match frame.kind.as_str() {
        "event" => {}
        "error" => {
            tracing::warn!(data = %frame.data, "Appwrite realtime error frame");
            return None;
        }
        _ => return None,
    }

    let event: RealtimeEvent = serde_json::from_value(frame.data).ok()?;
    let action = event.events.iter().find_map(|name| {
        if !name.contains(".documents.") {
            return None;
        }
        name.rsplit('.').next()
    })?;

    let document: InvoiceDocument = serde_json::from_value(event.payload).ok()?;
    match action {
        "delete" => Some(ChangeEvent::deleted(document.current_user, document.id)),
        "create" => document.into_invoice().ok().map(ChangeEvent::created),
        "update" => document.into_invoice().ok().map(ChangeEvent::updated),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ChangeKind;

    fn frame(event: &str) -> String {
        serde_json::json!({
            "type": "event",
            "data": {
                "events": [
                    format!("databases.main.collections.invoices.documents.65f0c1.{}", event),
                    format!("databases.*.collections.*.documents.*.{}", event),
                ],
                "channels": ["databases.main.collections.invoices.documents"],
                "timestamp": "2024-04-01 10:00:00.000",
                "payload": {
                    "$id": "65f0c1",
                    "clientName": "Ada Obi",
                    "clientEmail": "ada@example.com",
                    "amount": 200,
                    "vatPercentage": 10,
                    "dueDate": "2024-04-20",
                    "status": "paid",
                    "currentUser": "user-1"
                }
            }
        })
        .to_string()
    }

    fn listener(endpoint: &str) -> RealtimeListener {
        let (tx, _) = broadcast::channel(4);
        RealtimeListener::new(
            AppwriteConfig {
                endpoint: endpoint.to_string(),
                project_id: "proj".to_string(),
                database_id: "main".to_string(),
                invoices_collection_id: "invoices".to_string(),
                ..Default::default()
            },
            tx,
        )
    }

    #[test]
    fn test_parse_document_events() {
        let created = parse_realtime_message(&frame("create")).unwrap();
        assert_eq!(created.kind, ChangeKind::Created);
        assert_eq!(created.owner, "user-1");
        assert_eq!(created.invoice.as_ref().unwrap().total, 220.0);

        let updated = parse_realtime_message(&frame("update")).unwrap();
        assert_eq!(updated.kind, ChangeKind::Updated);

        let deleted = parse_realtime_message(&frame("delete")).unwrap();
        assert_eq!(deleted.kind, ChangeKind::Deleted);
        assert_eq!(deleted.invoice_id, "65f0c1");
        assert!(deleted.invoice.is_none());
    }

    #[test]
    fn test_ignores_other_frames() {
        assert!(parse_realtime_message(r#"{"type":"connected","data":{"channels":[]}}"#).is_none());
        assert!(parse_realtime_message(r#"{"type":"error","data":{"code":1008}}"#).is_none());
        assert!(parse_realtime_message("not json").is_none());
    }

    #[test]
    fn test_realtime_url() {
        let url = listener("https://cloud.appwrite.io/v1").url();
        assert!(url.starts_with("wss://cloud.appwrite.io/v1/realtime?project=proj&"));
        assert!(url.ends_with("channels%5B%5D=databases.main.collections.invoices.documents"));

        let url = listener("http://localhost/v1").url();
        assert!(url.starts_with("ws://localhost/v1/realtime"));
    }
}
