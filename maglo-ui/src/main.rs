//! Maglo Dashboard
//!
//! Invoicing dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Login and signup against the Maglo API
//! - Dashboard with metric cards, working capital chart and recent invoices
//! - Invoice list with search, status filter, CSV export and CRUD dialogs
//! - WebSocket live updates
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It communicates with the Maglo API via HTTP and WebSocket.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
