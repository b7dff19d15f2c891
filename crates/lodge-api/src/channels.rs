use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

use lodge_core::{membership, messaging};
use lodge_types::api::{
    ChannelCreateRequest, ChannelCreateResponse, ChannelDetailsResponse, ChannelIdRequest,
    ChannelUserRequest, ChannelsListResponse, MessagesResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub channel_id: i64,
    pub start: i64,
}

pub async fn create(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelCreateRequest>,
) -> ApiResult<Json<ChannelCreateResponse>> {
    Ok(Json(membership::create(
        &store,
        &token,
        &req.name,
        req.is_public,
    )?))
}

pub async fn list(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> ApiResult<Json<ChannelsListResponse>> {
    Ok(Json(membership::list(&store, &token)?))
}

pub async fn listall(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> ApiResult<Json<ChannelsListResponse>> {
    Ok(Json(membership::listall(&store, &token)?))
}

pub async fn invite(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelUserRequest>,
) -> ApiResult<Json<Value>> {
    membership::invite(&store, &token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn details(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelDetailsResponse>> {
    Ok(Json(membership::details(&store, &token, query.channel_id)?))
}

pub async fn messages(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    Ok(Json(messaging::messages(
        &store,
        &token,
        query.channel_id,
        query.start,
    )?))
}

pub async fn join(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<Json<Value>> {
    membership::join(&store, &token, req.channel_id)?;
    Ok(Json(json!({})))
}

pub async fn leave(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<Json<Value>> {
    membership::leave(&store, &token, req.channel_id)?;
    Ok(Json(json!({})))
}

pub async fn addowner(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelUserRequest>,
) -> ApiResult<Json<Value>> {
    membership::add_owner(&store, &token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn removeowner(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ChannelUserRequest>,
) -> ApiResult<Json<Value>> {
    membership::remove_owner(&store, &token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}
