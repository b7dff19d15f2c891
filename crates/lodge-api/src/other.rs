use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

use lodge_core::{messaging, notify};
use lodge_types::api::{NotificationsResponse, SearchResponse};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query_str: String,
}

pub async fn search(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    Ok(Json(messaging::search(&store, &token, &query.query_str)?))
}

pub async fn notifications_get(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> ApiResult<Json<NotificationsResponse>> {
    Ok(Json(notify::notifications_get(&store, &token)?))
}

/// Test-only reset back to the empty store.
pub async fn clear(State(store): State<AppState>) -> ApiResult<Json<Value>> {
    store.reset()?;
    Ok(Json(json!({})))
}
