//! Invoice change events
//!
//! Every backend write emits a [`ChangeEvent`] on a broadcast channel. The
//! forwarder pumps those events into the WebSocket hub, and clients patch
//! their invoice lists with [`apply_change`]. Merging is best effort: the
//! last event for an id wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::invoice::Invoice;
use crate::websocket::{ConnectionHub, WsEvent};

/// Kind of change on a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A create, update or delete of one invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// User the invoice belongs to
    pub owner: String,
    pub invoice_id: String,
    /// Document after the change; absent for deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
}

impl ChangeEvent {
    pub fn created(invoice: Invoice) -> Self {
        Self {
            kind: ChangeKind::Created,
            owner: invoice.current_user.clone(),
            invoice_id: invoice.id.clone(),
            invoice: Some(invoice),
        }
    }

    pub fn updated(invoice: Invoice) -> Self {
        Self {
            kind: ChangeKind::Updated,
            owner: invoice.current_user.clone(),
            invoice_id: invoice.id.clone(),
            invoice: Some(invoice),
        }
    }

    pub fn deleted(owner: impl Into<String>, invoice_id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            owner: owner.into(),
            invoice_id: invoice_id.into(),
            invoice: None,
        }
    }

    /// Hub topic the event is delivered on
    pub fn topic(&self) -> String {
        user_topic(&self.owner)
    }
}

/// Topic carrying one user's invoice changes
pub fn user_topic(user_id: &str) -> String {
    format!("invoices.{}", user_id)
}

/// Patch `list` with one change event
///
/// Created and updated events replace the invoice with the same id, or append
/// it when missing. Deleted events remove it. Applying the same event twice
/// leaves the list unchanged.
pub fn apply_change(list: &mut Vec<Invoice>, event: &ChangeEvent) {
    match event.kind {
        ChangeKind::Created | ChangeKind::Updated => {
            let Some(invoice) = &event.invoice else {
                return;
            };
            match list.iter_mut().find(|inv| inv.id == event.invoice_id) {
                Some(existing) => *existing = invoice.clone(),
                None => list.push(invoice.clone()),
            }
        }
        ChangeKind::Deleted => list.retain(|inv| inv.id != event.invoice_id),
    }
}

/// Forward backend change events to WebSocket subscribers
///
/// Runs until the backend drops its sender.
pub fn spawn_forwarder(
    mut changes: broadcast::Receiver<ChangeEvent>,
    hub: Arc<ConnectionHub>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    tracing::debug!(
                        kind = ?change.kind,
                        invoice_id = %change.invoice_id,
                        "Forwarding invoice change"
                    );
                    hub.broadcast(&WsEvent::from_change(change)).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change forwarder lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change feed closed, forwarder stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use crate::websocket::{HubConfig, ServerMessage};
    use chrono::NaiveDate;
    use tokio::sync::mpsc;

    fn invoice(id: &str, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: id.to_string(),
            client_name: "Ada".to_string(),
            client_email: "ada@example.com".to_string(),
            amount: 100.0,
            vat_percentage: 10.0,
            vat_amount: 10.0,
            total: 110.0,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            status,
            created_at: None,
            updated_at: None,
            current_user: "user-1".to_string(),
        }
    }

    #[test]
    fn test_created_appends_then_replaces() {
        let mut list = vec![invoice("a", InvoiceStatus::Paid)];
        let event = ChangeEvent::created(invoice("b", InvoiceStatus::Unpaid));

        apply_change(&mut list, &event);
        apply_change(&mut list, &event);

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, "b");
    }

    #[test]
    fn test_updated_replaces_in_place() {
        let mut list = vec![
            invoice("a", InvoiceStatus::Unpaid),
            invoice("b", InvoiceStatus::Unpaid),
        ];
        apply_change(&mut list, &ChangeEvent::updated(invoice("a", InvoiceStatus::Paid)));

        assert_eq!(list[0].id, "a");
        assert_eq!(list[0].status, InvoiceStatus::Paid);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_updated_missing_is_appended() {
        let mut list = Vec::new();
        apply_change(&mut list, &ChangeEvent::updated(invoice("x", InvoiceStatus::Paid)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_deleted_is_idempotent() {
        let mut list = vec![invoice("a", InvoiceStatus::Paid), invoice("b", InvoiceStatus::Paid)];
        let event = ChangeEvent::deleted("user-1", "a");

        apply_change(&mut list, &event);
        apply_change(&mut list, &event);

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b");
    }

    #[test]
    fn test_last_event_wins() {
        let mut list = Vec::new();
        apply_change(&mut list, &ChangeEvent::created(invoice("a", InvoiceStatus::Unpaid)));
        apply_change(&mut list, &ChangeEvent::updated(invoice("a", InvoiceStatus::Paid)));
        apply_change(&mut list, &ChangeEvent::updated(invoice("a", InvoiceStatus::Pending)));
        assert_eq!(list[0].status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_forwarder_delivers_to_owner_topic() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("user-1", tx).await.unwrap();
        hub.subscribe_user(&id, "user-1").await.unwrap();

        let (changes_tx, changes_rx) = broadcast::channel(16);
        let handle = spawn_forwarder(changes_rx, Arc::clone(&hub));

        changes_tx
            .send(ChangeEvent::created(invoice("a", InvoiceStatus::Paid)))
            .unwrap();
        drop(changes_tx);
        handle.await.unwrap();

        match rx.try_recv().unwrap() {
            ServerMessage::InvoiceCreated { invoice } => assert_eq!(invoice.id, "a"),
            other => panic!("Expected InvoiceCreated, got {:?}", other),
        }
    }
}
