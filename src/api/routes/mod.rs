//! API Routes
//!
//! Route handlers organized by functionality.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod invoices;
