//! API Client Module
//!
//! HTTP client for the Maglo REST API.

mod client;

pub use client::*;
