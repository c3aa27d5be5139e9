//! Auth Routes
//!
//! - POST /api/v1/auth/signup - Create an account and log it in
//! - POST /api/v1/auth/login - Start a password session
//! - POST /api/v1/auth/logout - End the current session
//! - GET /api/v1/auth/me - Session check

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AuthResponse, LoginRequest, MeResponse, SignupRequest};
use crate::api::error::ApiResult;
use crate::api::extract::JsonBody;
use crate::api::session::{bearer_token, CurrentUser};
use crate::api::state::AppState;

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (session, user) = state.auth.signup(&req.name, &req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token,
            display_name: user.display_name().to_string(),
            user,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// A bearer token on the request is treated as the previous session and
/// ended before the new one starts.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let previous = bearer_token(&headers);
    let (session, user) = state
        .auth
        .login(&req.email, &req.password, previous.as_deref())
        .await?;

    Ok(Json(AuthResponse {
        token: session.token,
        display_name: user.display_name().to_string(),
        user,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    state.auth.logout(&current.token).await?;
    tracing::info!(user_id = %current.user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse::new(current.user))
}
