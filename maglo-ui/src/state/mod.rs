//! State Management
//!
//! Global application state, the invoice model and the live feed connection.

pub mod global;
pub mod invoice;
pub mod websocket;

