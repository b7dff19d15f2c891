use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

/// The opaque session token as lifted from the Authorization header.
/// Resolving it to a user happens inside the core operations, against the
/// server-side session table.
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// Requires a `Bearer` Authorization header and hands the raw token to the
/// handlers via request extensions.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(AuthToken(token.to_string()));
    Ok(next.run(req).await)
}
