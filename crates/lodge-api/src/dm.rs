use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

use lodge_core::dm;
use lodge_types::api::{
    DmCreateRequest, DmCreateResponse, DmDetailsResponse, DmIdRequest, DmListResponse,
    DmUserRequest, MessagesResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

#[derive(Debug, Deserialize)]
pub struct DmQuery {
    pub dm_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DmMessagesQuery {
    pub dm_id: i64,
    pub start: i64,
}

pub async fn create(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<DmCreateRequest>,
) -> ApiResult<Json<DmCreateResponse>> {
    Ok(Json(dm::create(&store, &token, &req.u_ids)?))
}

pub async fn list(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> ApiResult<Json<DmListResponse>> {
    Ok(Json(dm::list(&store, &token)?))
}

pub async fn details(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<DmQuery>,
) -> ApiResult<Json<DmDetailsResponse>> {
    Ok(Json(dm::details(&store, &token, query.dm_id)?))
}

pub async fn messages(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<DmMessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    Ok(Json(dm::messages(&store, &token, query.dm_id, query.start)?))
}

pub async fn invite(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<DmUserRequest>,
) -> ApiResult<Json<Value>> {
    dm::invite(&store, &token, req.dm_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn leave(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<DmIdRequest>,
) -> ApiResult<Json<Value>> {
    dm::leave(&store, &token, req.dm_id)?;
    Ok(Json(json!({})))
}

pub async fn remove(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<DmIdRequest>,
) -> ApiResult<Json<Value>> {
    dm::remove(&store, &token, req.dm_id)?;
    Ok(Json(json!({})))
}
