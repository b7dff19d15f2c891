use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, header};

use lodge_core::identity;
use lodge_types::api::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest};

use crate::AppState;
use crate::error::ApiResult;

pub async fn register(
    State(store): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(identity::register(
        &store,
        &req.email,
        &req.password,
        &req.name_first,
        &req.name_last,
    )?))
}

pub async fn login(
    State(store): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(identity::login(&store, &req.email, &req.password)?))
}

/// Public route: a missing or unknown token answers `is_success: false`
/// instead of an error status.
pub async fn logout(State(store): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let response = match token {
        Some(token) => identity::logout(&store, token),
        None => LogoutResponse { is_success: false },
    };
    Json(response)
}
