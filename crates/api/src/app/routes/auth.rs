//! Public sign-in and registration routes.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, Utc};

use dashgate_auth::{LoginCredentials, RegisterCredentials, User};

use crate::app::{AppServices, dto::SessionResponse, errors};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginCredentials>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let now = Utc::now();
    match services.identity.authenticate(&body, now) {
        Ok(user) => session_response(&services, StatusCode::OK, user, now),
        Err(e) => errors::identity_error_to_response(e),
    }
}

/// POST /auth/register - New accounts start as active viewers
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterCredentials>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let now = Utc::now();
    match services.identity.register(&body, now) {
        Ok(user) => session_response(&services, StatusCode::CREATED, user, now),
        Err(e) => errors::identity_error_to_response(e),
    }
}

fn session_response(
    services: &AppServices,
    status: StatusCode,
    user: User,
    now: DateTime<Utc>,
) -> axum::response::Response {
    let claims = services.tokens.claims_for(&user, now);
    let token = match services.tokens.encode(&claims) {
        Ok(token) => token,
        Err(e) => return errors::token_error_to_response(e),
    };

    (
        status,
        Json(SessionResponse {
            token,
            expires_at: claims.expires_at,
            user,
        }),
    )
        .into_response()
}
