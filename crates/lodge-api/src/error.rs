use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use lodge_types::error::WorkspaceError;

/// Carries a domain failure to the wire: `InvalidInput` → 400,
/// `AccessDenied` → 403, storage failures → 500, each with a
/// `{code, name, message}` body.
pub struct ApiError(WorkspaceError);

impl From<WorkspaceError> for ApiError {
    fn from(e: WorkspaceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, name) = match &self.0 {
            WorkspaceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "InvalidInput"),
            WorkspaceError::AccessDenied(_) => (StatusCode::FORBIDDEN, "AccessDenied"),
            WorkspaceError::Storage(_) => {
                error!("storage failure: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "SystemError")
            }
        };
        let body = Json(json!({
            "code": status.as_u16(),
            "name": name,
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
