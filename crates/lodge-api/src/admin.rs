use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{Value, json};

use lodge_core::users;
use lodge_types::api::{AdminPermissionChangeRequest, AdminUserRemoveRequest};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthToken;

pub async fn user_remove(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<AdminUserRemoveRequest>,
) -> ApiResult<Json<Value>> {
    users::admin_user_remove(&store, &token, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn permission_change(
    State(store): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
    Json(req): Json<AdminPermissionChangeRequest>,
) -> ApiResult<Json<Value>> {
    users::admin_userpermission_change(&store, &token, req.u_id, req.permission_id)?;
    Ok(Json(json!({})))
}
