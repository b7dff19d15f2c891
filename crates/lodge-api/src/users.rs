use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

use lodge_core::users;
use lodge_types::api::{
    SetEmailRequest, SetHandleRequest, SetNameRequest, UserProfile, UsersAllResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub u_id: i64,
}

pub async fn profile(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(users::profile(&store, &token, query.u_id)?))
}

pub async fn all(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> ApiResult<Json<UsersAllResponse>> {
    Ok(Json(users::all(&store, &token)?))
}

pub async fn setname(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Json<Value>> {
    users::set_name(&store, &token, &req.name_first, &req.name_last)?;
    Ok(Json(json!({})))
}

pub async fn setemail(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Json<Value>> {
    users::set_email(&store, &token, &req.email)?;
    Ok(Json(json!({})))
}

pub async fn sethandle(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Json<Value>> {
    users::set_handle(&store, &token, &req.handle_str)?;
    Ok(Json(json!({})))
}
