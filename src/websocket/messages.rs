//! WebSocket Message Types
//!
//! Defines the messages exchanged between the dashboard and the server.

use serde::{Deserialize, Serialize};

use super::hub::SYSTEM_TOPIC;
use crate::invoice::Invoice;
use crate::realtime::{ChangeEvent, ChangeKind};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics (e.g., "invoices.{user_id}", "system")
    Subscribe { topics: Vec<String> },
    Unsubscribe { topics: Vec<String> },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established and authenticated
    Connected {
        connection_id: String,
        user_id: String,
    },
    Subscribed {
        topics: Vec<String>,
    },
    Unsubscribed {
        topics: Vec<String>,
    },
    InvoiceCreated {
        invoice: Invoice,
    },
    InvoiceUpdated {
        invoice: Invoice,
    },
    InvoiceDeleted {
        invoice_id: String,
    },
    /// Server-wide notice on the `system` topic
    Notice {
        message: String,
    },
    Pong,
    Error {
        message: String,
    },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "invoices.abc123")
    pub topic: String,
    pub message: ServerMessage,
}

impl WsEvent {
    /// Turn a backend change into a message on the owner's topic
    pub fn from_change(change: ChangeEvent) -> Self {
        let topic = change.topic();
        let message = match (change.kind, change.invoice) {
            (ChangeKind::Created, Some(invoice)) => ServerMessage::InvoiceCreated { invoice },
            (ChangeKind::Updated, Some(invoice)) => ServerMessage::InvoiceUpdated { invoice },
            _ => ServerMessage::InvoiceDeleted {
                invoice_id: change.invoice_id,
            },
        };
        Self { topic, message }
    }

    /// Create a system event
    pub fn system(message: &str) -> Self {
        Self {
            topic: SYSTEM_TOPIC.to_string(),
            message: ServerMessage::Notice {
                message: message.to_string(),
            },
        }
    }
}
