//! HTTP API Client
//!
//! Functions for communicating with the Maglo REST API. Every call but
//! signup, login and health carries the session token as a bearer header.

use gloo_net::http::{Request, RequestBuilder, Response};
use wasm_bindgen::JsCast;

use crate::state::invoice::{ChartBucket, Invoice, InvoiceForm, MetricCard, Overview, User};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8082/api/v1";

const API_URL_KEY: &str = "maglo_api_url";
const SESSION_KEY: &str = "maglo_session";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = local_storage()
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// Set the API base URL in local storage
pub fn set_api_base(url: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(API_URL_KEY, url);
    }
}

/// Session token saved by the last login
pub fn session_token() -> Option<String> {
    local_storage()
        .and_then(|storage| storage.get_item(SESSION_KEY).ok().flatten())
        .filter(|token| !token.is_empty())
}

fn store_session_token(token: Option<&str>) {
    if let Some(storage) = local_storage() {
        let _ = match token {
            Some(token) => storage.set_item(SESSION_KEY, token),
            None => storage.remove_item(SESSION_KEY),
        };
    }
}

// ============ Response Types ============

#[derive(Debug, serde::Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub display_name: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct MeResponse {
    pub user: User,
    pub display_name: String,
}

#[derive(Debug, serde::Deserialize)]
struct InvoiceListResponse {
    invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OverviewResponse {
    pub overview: Overview,
    pub cards: Vec<MetricCard>,
    pub currency_symbol: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    buckets: Vec<ChartBucket>,
}

#[derive(Debug, serde::Deserialize)]
struct RecentResponse {
    invoices: Vec<Invoice>,
}

#[derive(Debug, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub backend_status: String,
    pub websocket_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ============ Helpers ============

fn authorized(builder: RequestBuilder) -> RequestBuilder {
    match session_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

async fn send(builder: RequestBuilder, fallback: &str) -> Result<Response, String> {
    let response = builder
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    check(response, fallback).await
}

async fn send_json<T: serde::Serialize>(
    builder: RequestBuilder,
    body: &T,
    fallback: &str,
) -> Result<Response, String> {
    let response = builder
        .json(body)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    check(response, fallback).await
}

/// Turn a non-2xx response into the server's error message
async fn check(response: Response, fallback: &str) -> Result<Response, String> {
    if response.ok() {
        return Ok(response);
    }
    let message = response
        .json::<ApiError>()
        .await
        .map(|e| e.error.message)
        .unwrap_or_else(|_| fallback.to_string());
    Err(message)
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, String> {
    response.json().await.map_err(|e| format!("Parse error: {}", e))
}

// ============ Auth ============

/// Create an account and log in
pub async fn signup(name: &str, email: &str, password: &str) -> Result<AuthResponse, String> {
    #[derive(serde::Serialize)]
    struct SignupRequest<'a> {
        name: &'a str,
        email: &'a str,
        password: &'a str,
    }

    let api_base = get_api_base();
    let response = send_json(
        Request::post(&format!("{}/auth/signup", api_base)),
        &SignupRequest { name, email, password },
        "Signup failed",
    )
    .await?;

    let auth: AuthResponse = parse(response).await?;
    store_session_token(Some(&auth.token));
    Ok(auth)
}

/// Log in, replacing any previous session
pub async fn login(email: &str, password: &str) -> Result<AuthResponse, String> {
    #[derive(serde::Serialize)]
    struct LoginRequest<'a> {
        email: &'a str,
        password: &'a str,
    }

    let api_base = get_api_base();
    let response = send_json(
        authorized(Request::post(&format!("{}/auth/login", api_base))),
        &LoginRequest { email, password },
        "Login failed",
    )
    .await?;

    let auth: AuthResponse = parse(response).await?;
    store_session_token(Some(&auth.token));
    Ok(auth)
}

/// End the session; the local token is dropped even if the server call fails
pub async fn logout() -> Result<(), String> {
    let api_base = get_api_base();
    let result = send(
        authorized(Request::post(&format!("{}/auth/logout", api_base))),
        "Logout failed",
    )
    .await;
    store_session_token(None);
    result.map(|_| ())
}

/// Current session owner
pub async fn me() -> Result<MeResponse, String> {
    if session_token().is_none() {
        return Err("Not logged in".to_string());
    }
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&format!("{}/auth/me", api_base))),
        "Session expired. Please log in again.",
    )
    .await?;
    parse(response).await
}

// ============ Invoices ============

fn invoice_url(api_base: &str, id: &str) -> String {
    format!(
        "{}/invoices/{}",
        api_base,
        String::from(js_sys::encode_uri_component(id))
    )
}

/// Fetch every invoice of the user
pub async fn fetch_invoices() -> Result<Vec<Invoice>, String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&format!("{}/invoices", api_base))),
        "Failed to load invoices",
    )
    .await?;
    let list: InvoiceListResponse = parse(response).await?;
    Ok(list.invoices)
}

pub async fn fetch_invoice(id: &str) -> Result<Invoice, String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&invoice_url(&api_base, id))),
        "Invoice not found",
    )
    .await?;
    parse(response).await
}

pub async fn create_invoice(form: &InvoiceForm) -> Result<Invoice, String> {
    let api_base = get_api_base();
    let response = send_json(
        authorized(Request::post(&format!("{}/invoices", api_base))),
        form,
        "Failed to create invoice",
    )
    .await?;
    parse(response).await
}

pub async fn update_invoice(id: &str, form: &InvoiceForm) -> Result<Invoice, String> {
    let api_base = get_api_base();
    let response = send_json(
        authorized(Request::put(&invoice_url(&api_base, id))),
        form,
        "Failed to update invoice",
    )
    .await?;
    parse(response).await
}

/// Flip paid / unpaid
pub async fn toggle_status(id: &str) -> Result<Invoice, String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::post(&format!(
            "{}/toggle-status",
            invoice_url(&api_base, id)
        ))),
        "Failed to update status",
    )
    .await?;
    parse(response).await
}

pub async fn delete_invoice(id: &str) -> Result<(), String> {
    let api_base = get_api_base();
    send(
        authorized(Request::delete(&invoice_url(&api_base, id))),
        "Failed to delete invoice",
    )
    .await?;
    Ok(())
}

/// Download every invoice as a CSV file
pub async fn export_csv() -> Result<(), String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&format!("{}/invoices/export", api_base))),
        "Export failed",
    )
    .await?;
    let csv = response
        .text()
        .await
        .map_err(|e| format!("Parse error: {}", e))?;

    let filename = format!("invoices-{}.csv", chrono::Local::now().format("%Y-%m-%d"));
    download(&csv, &filename, "text/csv")
}

/// Hand text to the browser as a file download
fn download(content: &str, filename: &str, mime: &str) -> Result<(), String> {
    let parts = js_sys::Array::of1(&content.into());
    let mut options = web_sys::BlobPropertyBag::new();
    options.type_(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|e| format!("Export failed: {:?}", e))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("Export failed: {:?}", e))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("Export failed: no document")?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Export failed: {:?}", e))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Export failed: not an anchor".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

// ============ Dashboard ============

pub async fn fetch_overview() -> Result<OverviewResponse, String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&format!("{}/dashboard/overview", api_base))),
        "Failed to load overview",
    )
    .await?;
    parse(response).await
}

/// Chart buckets; `None` covers every date with invoices
pub async fn fetch_chart(days: Option<u32>) -> Result<Vec<ChartBucket>, String> {
    let api_base = get_api_base();
    let url = match days {
        Some(days) => format!("{}/dashboard/chart?days={}", api_base, days),
        None => format!("{}/dashboard/chart", api_base),
    };
    let response = send(authorized(Request::get(&url)), "Failed to load chart").await?;
    let chart: ChartResponse = parse(response).await?;
    Ok(chart.buckets)
}

pub async fn fetch_recent() -> Result<Vec<Invoice>, String> {
    let api_base = get_api_base();
    let response = send(
        authorized(Request::get(&format!("{}/dashboard/recent", api_base))),
        "Failed to load recent invoices",
    )
    .await?;
    let recent: RecentResponse = parse(response).await?;
    Ok(recent.invoices)
}

/// Check API health
pub async fn check_health() -> Result<HealthResponse, String> {
    let api_base = get_api_base();
    let health_url = api_base.replace("/api/v1", "/health");

    let response = Request::get(&health_url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err("API is not healthy".to_string());
    }

    parse(response).await
}
