//! Appwrite backend
//!
//! - **client**: REST calls for accounts, sessions and invoice documents
//! - **document**: wire format of the invoices collection
//! - **realtime**: background listener on the collection's realtime channel

mod client;
mod document;
mod realtime;

pub use client::{AppwriteClient, AppwriteConfig};
pub use document::{AppwriteErrorBody, InvoiceDocument};
pub use realtime::{parse_realtime_message, RealtimeListener};
