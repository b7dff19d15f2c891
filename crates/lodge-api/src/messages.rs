use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{Value, json};

use lodge_core::messaging;
use lodge_types::api::{
    EditMessageRequest, MessageIdResponse, RemoveMessageRequest, SendDmMessageRequest,
    SendMessageRequest, ShareMessageRequest, ShareMessageResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

pub async fn send(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    Ok(Json(messaging::send(
        &store,
        &token,
        req.channel_id,
        &req.message,
    )?))
}

pub async fn senddm(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<SendDmMessageRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    Ok(Json(messaging::senddm(
        &store,
        &token,
        req.dm_id,
        &req.message,
    )?))
}

pub async fn edit(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<Json<Value>> {
    messaging::edit(&store, &token, req.message_id, &req.message)?;
    Ok(Json(json!({})))
}

pub async fn remove(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<RemoveMessageRequest>,
) -> ApiResult<Json<Value>> {
    messaging::remove(&store, &token, req.message_id)?;
    Ok(Json(json!({})))
}

pub async fn share(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<ShareMessageRequest>,
) -> ApiResult<Json<ShareMessageResponse>> {
    Ok(Json(messaging::share(
        &store,
        &token,
        req.og_message_id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?))
}
