//! WebSocket Client
//!
//! Live invoice feed from the Maglo API. The server subscribes the
//! connection to the user's own topic on connect.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::global::GlobalState;
use super::invoice::{Invoice, InvoiceChange};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// WebSocket message types from server
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
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
    Notice {
        message: String,
    },
    Pong,
    Error {
        message: String,
    },
}

impl WsMessage {
    /// The list change carried by this message, if any
    pub fn into_change(self) -> Option<InvoiceChange> {
        match self {
            WsMessage::InvoiceCreated { invoice } | WsMessage::InvoiceUpdated { invoice } => {
                Some(InvoiceChange::Upsert(invoice))
            }
            WsMessage::InvoiceDeleted { invoice_id } => Some(InvoiceChange::Deleted(invoice_id)),
            _ => None,
        }
    }
}

/// WebSocket client for real-time updates
#[derive(Clone)]
pub struct WebSocketClient {
    ws: Rc<RefCell<Option<WebSocket>>>,
    url: String,
    reconnect_attempts: Rc<RefCell<u32>>,
    /// Set by `close`; stops the reconnect loop
    closed: Rc<RefCell<bool>>,
}

impl WebSocketClient {
    /// Create a new WebSocket client
    pub fn new(url: &str) -> Self {
        Self {
            ws: Rc::new(RefCell::new(None)),
            url: url.to_string(),
            reconnect_attempts: Rc::new(RefCell::new(0)),
            closed: Rc::new(RefCell::new(false)),
        }
    }

    /// Connect to the WebSocket server
    pub fn connect(&self, state: GlobalState) {
        match WebSocket::new(&self.url) {
            Ok(ws) => {
                self.setup_handlers(&ws, state);
                *self.ws.borrow_mut() = Some(ws);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
                self.schedule_reconnect(state);
            }
        }
    }

    /// Set up WebSocket event handlers
    fn setup_handlers(&self, ws: &WebSocket, state: GlobalState) {
        // On open
        let state_clone = state.clone();
        let reconnect_clone = Rc::clone(&self.reconnect_attempts);
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            web_sys::console::log_1(&"WebSocket connected".into());
            state_clone.ws_connected.set(true);
            *reconnect_clone.borrow_mut() = 0;
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        // On message
        let state_clone = state.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                let text_str: String = text.into();
                handle_message(&text_str, &state_clone);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        // On close
        let client = self.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(
                &format!("WebSocket closed: code={}, reason={}", event.code(), event.reason()).into(),
            );
            state.ws_connected.set(false);
            client.schedule_reconnect(state.clone());
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        // On error
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }

    /// Schedule a reconnect attempt with exponential backoff
    fn schedule_reconnect(&self, state: GlobalState) {
        if *self.closed.borrow() {
            return;
        }
        let attempts = *self.reconnect_attempts.borrow();
        if attempts >= MAX_RECONNECT_ATTEMPTS {
            web_sys::console::error_1(&"Max reconnect attempts reached".into());
            return;
        }

        let delay = (2_u32.pow(attempts) * 1000).min(30000);
        *self.reconnect_attempts.borrow_mut() = attempts + 1;

        let client = self.clone();
        gloo_timers::callback::Timeout::new(delay, move || {
            web_sys::console::log_1(&format!("Attempting reconnect (attempt {})", attempts + 1).into());
            client.connect(state);
        }).forget();
    }

    /// Close the connection for good
    pub fn close(&self) {
        *self.closed.borrow_mut() = true;
        if let Some(ws) = self.ws.borrow_mut().take() {
            let _ = ws.close();
        }
    }
}

/// Handle incoming WebSocket message
fn handle_message(text: &str, state: &GlobalState) {
    let msg = match serde_json::from_str::<WsMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to parse WebSocket message: {}", e).into());
            return;
        }
    };

    match msg {
        WsMessage::Connected { connection_id, user_id } => {
            web_sys::console::log_1(
                &format!("Connected with ID: {} (user {})", connection_id, user_id).into(),
            );
        }
        WsMessage::Subscribed { topics } => {
            web_sys::console::log_1(&format!("Subscribed to: {:?}", topics).into());
        }
        WsMessage::Unsubscribed { topics } => {
            web_sys::console::log_1(&format!("Unsubscribed from: {:?}", topics).into());
        }
        WsMessage::Notice { message } => {
            state.show_success(&message);
        }
        WsMessage::Pong => {
            // Connection alive
        }
        WsMessage::Error { message } => {
            web_sys::console::error_1(&format!("Server error: {}", message).into());
            state.show_error(&message);
        }
        change => {
            if let Some(change) = change.into_change() {
                state.apply_invoice_change(change);
            }
        }
    }
}

/// WebSocket URL for the session: `ws(s)://.../api/v1/ws?token=...`
pub fn ws_url(api_base: &str, token: &str) -> String {
    let base = api_base.replace("http://", "ws://").replace("https://", "wss://");
    format!(
        "{}/ws?token={}",
        base,
        String::from(js_sys::encode_uri_component(token))
    )
}

/// Open the live feed for the logged-in user (call after login)
pub fn init_websocket(state: GlobalState, api_base: &str, token: &str) -> WebSocketClient {
    let client = WebSocketClient::new(&ws_url(api_base, token));
    client.connect(state);
    client
}
