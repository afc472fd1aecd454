use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use dashgate_auth::{IdentityProvider, TokenValidator, User};

use crate::app::errors::json_error;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthLayer {
    pub tokens: Arc<dyn TokenValidator>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Verify the bearer token and attach the current user record.
///
/// The user is reloaded on every request so role and status changes apply
/// before the token expires.
pub async fn auth_middleware(
    State(state): State<AuthLayer>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| unauthorized("missing bearer token"))?;

    let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        unauthorized("invalid or expired session token")
    })?;

    let user = state
        .identity
        .find_user(claims.sub)
        .filter(User::is_active)
        .ok_or_else(|| unauthorized("account is unknown or not active"))?;

    req.extensions_mut().insert(CurrentUser::new(user));

    Ok(next.run(req).await)
}

fn unauthorized(message: &'static str) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
