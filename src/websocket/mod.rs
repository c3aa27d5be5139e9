//! WebSocket real-time invoice feed
//!
//! - **ConnectionHub**: authenticated connections and topic subscriptions
//! - **Handler**: upgrade, session check and message loop
//! - **Messages**: client and server message formats
//!
//! Clients connect to `/api/v1/ws?token=<session>` and are subscribed to
//! `invoices.{user_id}` on connect. The `system` topic carries server notices.
//!
//! ```javascript
//! const ws = new WebSocket(`ws://localhost:8082/api/v1/ws?token=${token}`);
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'invoice_updated') { /* patch list */ }
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::{websocket_handler, WsParams};
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError, SYSTEM_TOPIC};
pub use messages::{ClientMessage, ServerMessage, WsEvent};
