//! Invoice Routes
//!
//! CRUD over the logged-in user's invoices.
//!
//! - GET /api/v1/invoices - List with status counts, filter and search
//! - POST /api/v1/invoices - Create an invoice
//! - GET /api/v1/invoices/export - CSV export
//! - GET /api/v1/invoices/:id - Get one invoice
//! - PUT /api/v1/invoices/:id - Resubmit the edit form
//! - POST /api/v1/invoices/:id/toggle-status - Mark as paid / unpaid
//! - DELETE /api/v1/invoices/:id - Delete an invoice

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{InvoiceListParams, InvoiceListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{JsonBody, QueryParams};
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::invoice::{
    filter_invoices, search_invoices, to_csv, Invoice, InvoiceInput, StatusCounts, StatusFilter,
};

/// GET /api/v1/invoices
///
/// Counts cover the whole list; search and status filter narrow the rows.
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    QueryParams(params): QueryParams<InvoiceListParams>,
) -> ApiResult<Json<InvoiceListResponse>> {
    let filter: StatusFilter = params.status.as_deref().unwrap_or_default().parse()?;

    let all = state.invoices.list(&current.user.id).await?;
    let counts = StatusCounts::from_invoices(&all);

    let searched = search_invoices(&all, params.search.as_deref().unwrap_or_default());
    let invoices = filter_invoices(&searched, filter);

    Ok(Json(InvoiceListResponse {
        total: invoices.len(),
        invoices,
        counts,
    }))
}

/// POST /api/v1/invoices
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    JsonBody(input): JsonBody<InvoiceInput>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let record = input.validate()?;
    let invoice = state.invoices.create(&current.user.id, &record).await?;

    tracing::info!(
        user_id = %current.user.id,
        invoice_id = %invoice.id,
        total = invoice.total,
        "Invoice created"
    );

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /api/v1/invoices/:id
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    let invoice = state.invoices.get(&current.user.id, &id).await?;
    Ok(Json(invoice))
}

/// PUT /api/v1/invoices/:id
///
/// Every editable field is overwritten and the derived amounts recomputed.
pub async fn update_invoice(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<InvoiceInput>,
) -> ApiResult<Json<Invoice>> {
    let record = input.validate()?;
    let invoice = state.invoices.update(&current.user.id, &id, &record).await?;

    tracing::info!(user_id = %current.user.id, invoice_id = %id, "Invoice updated");
    Ok(Json(invoice))
}

/// POST /api/v1/invoices/:id/toggle-status
pub async fn toggle_status(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    let existing = state.invoices.get(&current.user.id, &id).await?;
    let status = existing.status.toggled();
    let invoice = state
        .invoices
        .set_status(&current.user.id, &id, status)
        .await?;

    tracing::info!(
        user_id = %current.user.id,
        invoice_id = %id,
        from = %existing.status,
        to = %status,
        "Invoice status toggled"
    );
    Ok(Json(invoice))
}

/// DELETE /api/v1/invoices/:id
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.invoices.delete(&current.user.id, &id).await?;

    tracing::info!(user_id = %current.user.id, invoice_id = %id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/invoices/export
pub async fn export_invoices(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Response> {
    let invoices = state.invoices.list(&current.user.id).await?;
    let body = to_csv(&invoices).map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))?;

    let filename = format!("invoices-{}.csv", Utc::now().format("%Y-%m-%d"));
    tracing::info!(user_id = %current.user.id, count = invoices.len(), "Invoices exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
