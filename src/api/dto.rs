//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON. Invoices and the
//! overview keep the camelCase shape of the stored documents; envelopes use
//! snake_case.

use serde::{Deserialize, Serialize};

use crate::backend::User;
use crate::dashboard::{ChartBucket, MetricCard, Overview};
use crate::invoice::{Invoice, StatusCounts};

// ============================================
// AUTH DTOs
// ============================================

/// Signup form
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session issued by signup or login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: User,
    /// Name shown in the topbar
    pub display_name: String,
}

/// Current session owner
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    pub display_name: String,
}

impl MeResponse {
    pub fn new(user: User) -> Self {
        let display_name = user.display_name().to_string();
        Self { user, display_name }
    }
}

// ============================================
// INVOICE DTOs
// ============================================

/// Query parameters for the invoice list
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListParams {
    /// all | paid | unpaid | pending
    #[serde(default)]
    pub status: Option<String>,
    /// Case-insensitive match on client name or email
    #[serde(default)]
    pub search: Option<String>,
}

/// Invoice list response
#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<Invoice>,
    /// Counts over the user's whole list, for the filter dropdown
    pub counts: StatusCounts,
    /// Number of invoices returned after filtering
    pub total: usize,
}

// ============================================
// DASHBOARD DTOs
// ============================================

/// Overview metrics plus the rendered cards
#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub overview: Overview,
    pub cards: Vec<MetricCard>,
    pub currency_symbol: String,
}

/// Query parameters for the chart
#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    /// Limit buckets to the last N days ending today
    #[serde(default)]
    pub days: Option<u32>,
}

/// Chart response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub buckets: Vec<ChartBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

/// Query parameters for recent invoices
#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Recent invoices response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentResponse {
    pub invoices: Vec<Invoice>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Backend kind: "appwrite" or "local"
    pub backend: String,
    /// Backend reachability: "ok" or "error"
    pub backend_status: String,
    /// Open realtime connections
    pub websocket_connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
