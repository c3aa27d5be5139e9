//! Dashboard Routes
//!
//! - GET /api/v1/dashboard/overview - Summary metrics and cards
//! - GET /api/v1/dashboard/chart - Daily income/expense buckets
//! - GET /api/v1/dashboard/recent - Most recently created invoices

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{ChartParams, ChartResponse, OverviewResponse, RecentParams, RecentResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::QueryParams;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::dashboard::{daily_buckets, recent_invoices, Overview};

/// Upper bound on `?limit=` for the recent list
const MAX_RECENT_LIMIT: usize = 100;

/// GET /api/v1/dashboard/overview
pub async fn overview(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<OverviewResponse>> {
    let invoices = state.invoices.list(&current.user.id).await?;
    let settings = &state.config.dashboard;

    let today = Utc::now().date_naive();
    let overview = Overview::compute(&invoices, today, settings.upcoming_window_days);
    let cards = overview.cards(&settings.currency_symbol);

    Ok(Json(OverviewResponse {
        overview,
        cards,
        currency_symbol: settings.currency_symbol.clone(),
    }))
}

/// GET /api/v1/dashboard/chart
pub async fn chart(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    QueryParams(params): QueryParams<ChartParams>,
) -> ApiResult<Json<ChartResponse>> {
    if params.days == Some(0) {
        return Err(ApiError::Validation("days must be at least 1".to_string()));
    }

    let invoices = state.invoices.list(&current.user.id).await?;
    let today = Utc::now().date_naive();

    Ok(Json(ChartResponse {
        buckets: daily_buckets(&invoices, today, params.days),
        days: params.days,
    }))
}

/// GET /api/v1/dashboard/recent
pub async fn recent(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    QueryParams(params): QueryParams<RecentParams>,
) -> ApiResult<Json<RecentResponse>> {
    let limit = params
        .limit
        .unwrap_or(state.config.dashboard.recent_limit)
        .min(MAX_RECENT_LIMIT);

    let invoices = state.invoices.list(&current.user.id).await?;

    Ok(Json(RecentResponse {
        invoices: recent_invoices(&invoices, limit),
    }))
}
