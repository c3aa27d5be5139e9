//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::{ApiError, ApiResult, AppState};

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Session token; browsers cannot set headers on a WebSocket handshake
    pub token: Option<String>,
}

/// GET /api/v1/ws?token=...
///
/// Authenticates the session, then upgrades. The connection is subscribed
/// to its user's invoice topic straight away.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    let user = state
        .auth
        .current_user(&token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    let hub = Arc::clone(&state.ws_hub);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, user.id)))
}

fn to_text(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>, user_id: String) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(&user_id, tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(msg) = to_text(&error_msg) {
                let _ = sender.send(msg).await;
            }
            return;
        }
    };

    let connected_msg = ServerMessage::Connected {
        connection_id: connection_id.clone(),
        user_id: user_id.clone(),
    };
    let sent = match to_text(&connected_msg) {
        Some(msg) => sender.send(msg).await.is_ok(),
        None => false,
    };
    if !sent {
        tracing::error!(connection_id = %connection_id, "Failed to send connected message");
        hub.unregister(&connection_id).await;
        return;
    }

    match hub.subscribe_user(&connection_id, &user_id).await {
        Ok(topics) => {
            let _ = hub
                .send_to(&connection_id, ServerMessage::Subscribed { topics })
                .await;
        }
        Err(e) => {
            tracing::error!(connection_id = %connection_id, error = %e, "Auto-subscribe failed");
        }
    }

    let conn_id_for_send = connection_id.clone();

    // Forward queued messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(text) = to_text(&msg) else {
                continue;
            };
            if sender.send(text).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &conn_id_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a frame from the client
///
/// Returns false once the client asked to close.
async fn handle_ws_message(hub: &Arc<ConnectionHub>, connection_id: &str, message: Message) -> bool {
    let reply = match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(client_msg) => handle_client_message(hub, connection_id, client_msg).await,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Invalid client message");
                ServerMessage::Error {
                    message: format!("Invalid message format: {}", e),
                }
            }
        },
        Message::Binary(_) => ServerMessage::Error {
            message: "Binary messages not supported".to_string(),
        },
        // Protocol pings are answered by axum
        Message::Ping(_) | Message::Pong(_) => return true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            return false;
        }
    };

    let _ = hub.send_to(connection_id, reply).await;
    true
}

/// Apply a client request and build the reply
async fn handle_client_message(
    hub: &Arc<ConnectionHub>,
    connection_id: &str,
    message: ClientMessage,
) -> ServerMessage {
    let result = match message {
        ClientMessage::Subscribe { topics } => hub
            .subscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Subscribed { topics }),
        ClientMessage::Unsubscribe { topics } => hub
            .unsubscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Unsubscribed { topics }),
        ClientMessage::Ping => Ok(ServerMessage::Pong),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(connection_id = %connection_id, error = %e, "Client request rejected");
        ServerMessage::Error {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_params_token_optional() {
        let params: WsParams = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(params.token.as_deref(), Some("abc"));

        let params: WsParams = serde_json::from_str("{}").unwrap();
        assert!(params.token.is_none());
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        let hub = Arc::new(ConnectionHub::new(Default::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("user-1", tx).await.unwrap();

        let keep_open = handle_ws_message(&hub, &id, Message::Text(r#"{"type":"ping"}"#.to_string())).await;

        assert!(keep_open);
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Pong));
    }

    #[tokio::test]
    async fn test_invalid_message_keeps_connection() {
        let hub = Arc::new(ConnectionHub::new(Default::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("user-1", tx).await.unwrap();

        assert!(handle_ws_message(&hub, &id, Message::Text("nope".to_string())).await);
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Error { .. }));
        assert!(!handle_ws_message(&hub, &id, Message::Close(None)).await);
    }

    #[tokio::test]
    async fn test_foreign_subscribe_answers_error() {
        let hub = Arc::new(ConnectionHub::new(Default::default()));
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
        let id = hub.register("user-1", tx).await.unwrap();

        let msg = ClientMessage::Subscribe {
            topics: vec!["invoices.user-2".to_string()],
        };
        let reply = handle_client_message(&hub, &id, msg).await;
        assert!(rx.try_recv().is_err());

        match reply {
            ServerMessage::Error { message } => assert!(message.contains("invoices.user-2")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }
}
