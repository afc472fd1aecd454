use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use dashgate_auth::{AuthzError, IdentityError, TokenError};

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::InvalidRole(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_role", err.to_string())
        }
        AuthzError::InvalidPermission(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_permission", err.to_string())
        }
        AuthzError::Forbidden(_) | AuthzError::InsufficientRole { .. } => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        AuthzError::SelfModification => {
            json_error(StatusCode::FORBIDDEN, "self_modification", err.to_string())
        }
    }
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    let (status, code) = match &err {
        IdentityError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        IdentityError::AccountNotActive(_) => (StatusCode::FORBIDDEN, "account_not_active"),
        IdentityError::EmailTaken => (StatusCode::CONFLICT, "email_taken"),
        IdentityError::PasswordMismatch => (StatusCode::BAD_REQUEST, "password_mismatch"),
        IdentityError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        IdentityError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        IdentityError::PasswordHash(_) => {
            tracing::error!(error = %err, "password hashing failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            );
        }
    };
    json_error(status, code, err.to_string())
}

/// Malformed or mistyped request bodies.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    tracing::error!(error = %err, "failed to issue session token");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "token_error",
        "could not issue session token",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
