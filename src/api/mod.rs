//! Maglo REST API
//!
//! HTTP API layer for Maglo, built with Axum. Every `/api/v1` route except
//! signup and login expects `Authorization: Bearer <session token>`.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/v1/auth/signup` - Create an account and session
//! - `POST /api/v1/auth/login` - Password session
//! - `POST /api/v1/auth/logout` - End the session
//! - `GET /api/v1/auth/me` - Session check
//!
//! ## Invoices
//! - `GET /api/v1/invoices` - List with counts (`?status=&search=`)
//! - `POST /api/v1/invoices` - Create an invoice
//! - `GET /api/v1/invoices/export` - CSV export
//! - `GET /api/v1/invoices/:id` - Get an invoice
//! - `PUT /api/v1/invoices/:id` - Update an invoice
//! - `POST /api/v1/invoices/:id/toggle-status` - Paid / unpaid
//! - `DELETE /api/v1/invoices/:id` - Delete an invoice
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard/overview` - Summary metrics and cards
//! - `GET /api/v1/dashboard/chart` - Daily buckets (`?days=`)
//! - `GET /api/v1/dashboard/recent` - Recent invoices (`?limit=`)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws?token=` - Live invoice changes
//!
//! # Example
//!
//! ```rust,ignore
//! use maglo::api::{serve, AppState};
//! use maglo::backend::Backend;
//! use maglo::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let backend = Backend::from_config(&config)?;
//!     let api_config = config.api.clone();
//!
//!     let state = AppState::new(&backend, config);
//!     serve(state, &api_config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use session::CurrentUser;
pub use state::{ApiConfig, AppState};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::websocket::{websocket_handler, WsEvent};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        // Invoice routes
        .route(
            "/invoices",
            get(routes::invoices::list_invoices).post(routes::invoices::create_invoice),
        )
        .route("/invoices/export", get(routes::invoices::export_invoices))
        .route(
            "/invoices/:id",
            get(routes::invoices::get_invoice)
                .put(routes::invoices::update_invoice)
                .delete(routes::invoices::delete_invoice),
        )
        .route(
            "/invoices/:id/toggle-status",
            post(routes::invoices::toggle_status),
        )
        // Dashboard routes
        .route("/dashboard/overview", get(routes::dashboard::overview))
        .route("/dashboard/chart", get(routes::dashboard::chart))
        .route("/dashboard/recent", get(routes::dashboard::recent))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.api.request_timeout_secs.max(1),
        )))
        // WebSocket route (outside the request timeout)
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.api.cors_origins);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
///
/// Connected realtime clients get a notice on the `system` topic before the
/// server drains.
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let hub = Arc::clone(&state.ws_hub);
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Maglo API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            hub.broadcast(&WsEvent::system("Server shutting down")).await;
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Maglo API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, LocalBackend};
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let local = Arc::new(LocalBackend::in_memory().unwrap());
        let state = AppState::new(&Backend::local(local), Config::default());
        build_router(state)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup(app: &Router, email: &str) -> String {
        let response = send(
            app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({"name": "Ada Obi", "email": email, "password": "password123"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn invoice_body(name: &str, amount: f64, vat: f64, due_in_days: i64, status: &str) -> Value {
        let due = Utc::now().date_naive() + ChronoDuration::days(due_in_days);
        json!({
            "clientName": name,
            "clientEmail": "billing@example.com",
            "amount": amount,
            "vatPercentage": vat,
            "dueDate": due.format("%Y-%m-%d").to_string(),
            "status": status,
        })
    }

    async fn create_invoice(app: &Router, token: &str, body: Value) -> Value {
        let response = send(app, "POST", "/api/v1/invoices", Some(token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();
        let response = send(&app, "GET", "/health/live", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();
        let response = send(&app, "GET", "/health/ready", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();
        let response = send(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "local");
        assert_eq!(body["websocket_connections"], 0);
    }

    #[tokio::test]
    async fn test_signup_and_session_check() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        let response = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["display_name"], "Ada Obi");
        assert_eq!(body["user"]["email"], "ada@example.com");

        let response = send(&app, "GET", "/api/v1/auth/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, "GET", "/api/v1/auth/me", Some("bogus"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_validation_error_envelope() {
        let app = create_test_app();
        let response = send(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({"name": "Ada", "email": "ada@example.com", "password": "short"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "Password must be at least 8 characters"
        );
        assert!(body["request_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let app = create_test_app();
        signup(&app, "ada@example.com").await;

        let response = send(
            &app,
            "POST",
            "/api/v1/auth/signup",
            None,
            Some(json!({"name": "Ada", "email": "ada@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let app = create_test_app();
        let first = signup(&app, "ada@example.com").await;

        let response = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(&first),
            Some(json!({"email": "ada@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        // the previous session was replaced
        let response = send(&app, "GET", "/api/v1/auth/me", Some(&first), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invoices_require_session() {
        let app = create_test_app();
        let response = send(&app, "GET", "/api/v1/invoices", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_invoice_derives_amounts() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        let invoice = create_invoice(&app, &token, invoice_body("Acme", 200.0, 10.0, 3, "unpaid")).await;
        assert_eq!(invoice["vatAmount"], 20.0);
        assert_eq!(invoice["total"], 220.0);
        assert_eq!(invoice["status"], "unpaid");
        assert!(invoice["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_create_invoice_validation() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        let mut body = invoice_body("Acme", 200.0, 10.0, 3, "unpaid");
        body["clientEmail"] = json!("not-an-email");
        let response = send(&app, "POST", "/api/v1/invoices", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = invoice_body("Acme", 200.0, 150.0, 3, "unpaid");
        let response = send(&app, "POST", "/api/v1/invoices", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        create_invoice(&app, &token, invoice_body("Acme", 100.0, 0.0, 1, "paid")).await;
        create_invoice(&app, &token, invoice_body("Globex", 200.0, 0.0, 2, "unpaid")).await;
        create_invoice(&app, &token, invoice_body("Initech", 300.0, 0.0, 3, "pending")).await;

        let response = send(&app, "GET", "/api/v1/invoices?status=unpaid", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["invoices"][0]["clientName"], "Globex");
        assert_eq!(body["counts"]["all"], 3);
        assert_eq!(body["counts"]["paid"], 1);
        assert_eq!(body["counts"]["pending"], 1);

        let response = send(&app, "GET", "/api/v1/invoices?search=INI", Some(&token), None).await;
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["invoices"][0]["clientName"], "Initech");

        let response = send(&app, "GET", "/api/v1/invoices?status=archived", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_toggle_and_delete() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        let invoice = create_invoice(&app, &token, invoice_body("Acme", 200.0, 10.0, 3, "unpaid")).await;
        let uri = format!("/api/v1/invoices/{}", invoice["id"].as_str().unwrap());

        let response = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(invoice_body("Acme Ltd", 300.0, 5.0, 3, "unpaid")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["clientName"], "Acme Ltd");
        assert_eq!(updated["vatAmount"], 15.0);
        assert_eq!(updated["total"], 315.0);

        let toggle_uri = format!("{}/toggle-status", uri);
        let response = send(&app, "POST", &toggle_uri, Some(&token), None).await;
        assert_eq!(body_json(response).await["status"], "paid");
        let response = send(&app, "POST", &toggle_uri, Some(&token), None).await;
        assert_eq!(body_json(response).await["status"], "unpaid");

        let response = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invoices_are_private() {
        let app = create_test_app();
        let ada = signup(&app, "ada@example.com").await;
        let bola = signup(&app, "bola@example.com").await;

        let invoice = create_invoice(&app, &ada, invoice_body("Acme", 200.0, 10.0, 3, "unpaid")).await;
        let uri = format!("/api/v1/invoices/{}", invoice["id"].as_str().unwrap());

        let response = send(&app, "GET", &uri, Some(&bola), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", &uri, Some(&bola), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "GET", "/api/v1/invoices", Some(&bola), None).await;
        assert_eq!(body_json(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;
        create_invoice(&app, &token, invoice_body("Acme", 200.0, 10.0, 3, "unpaid")).await;

        let response = send(&app, "GET", "/api/v1/invoices/export", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("id,clientName,clientEmail"));
        assert!(text.contains("Acme"));
    }

    #[tokio::test]
    async fn test_dashboard_endpoints() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        create_invoice(&app, &token, invoice_body("Acme", 100.0, 10.0, 2, "paid")).await;
        create_invoice(&app, &token, invoice_body("Globex", 200.0, 0.0, 3, "unpaid")).await;
        create_invoice(&app, &token, invoice_body("Initech", 50.0, 0.0, -4, "unpaid")).await;

        let response = send(&app, "GET", "/api/v1/dashboard/overview", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["overview"]["totalInvoices"], 3);
        assert_eq!(body["overview"]["totalIncome"], 350.0);
        assert_eq!(body["overview"]["amountPaid"], 100.0);
        assert_eq!(body["overview"]["pendingPayments"], 250.0);
        assert_eq!(body["overview"]["upcomingDue"].as_array().unwrap().len(), 1);
        assert_eq!(body["overview"]["overdue"].as_array().unwrap().len(), 1);
        assert_eq!(body["cards"].as_array().unwrap().len(), 3);

        let response = send(&app, "GET", "/api/v1/dashboard/chart?days=7", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["buckets"].as_array().unwrap().len(), 1);

        let response = send(&app, "GET", "/api/v1/dashboard/chart", Some(&token), None).await;
        let body = body_json(response).await;
        assert_eq!(body["buckets"].as_array().unwrap().len(), 3);

        let response = send(&app, "GET", "/api/v1/dashboard/chart?days=0", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            send(&app, "GET", "/api/v1/dashboard/chart?days=4294967295", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["buckets"].as_array().unwrap().len(), 1);

        let response = send(&app, "GET", "/api/v1/dashboard/recent?limit=2", Some(&token), None).await;
        let body = body_json(response).await;
        let recent = body["invoices"].as_array().unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0]["clientName"], "Initech");
    }

    #[tokio::test]
    async fn test_malformed_input_uses_error_envelope() {
        let app = create_test_app();
        let token = signup(&app, "ada@example.com").await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/invoices")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"clientName\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
        assert!(body["request_id"].is_string());

        let response =
            send(&app, "GET", "/api/v1/dashboard/recent?limit=many", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
