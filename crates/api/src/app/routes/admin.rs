//! Admin routes for user management.
//!
//! Every handler requires `manage_users`; the checks run before any lookup so
//! non-admins learn nothing about other accounts.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;

use dashgate_auth::{Permission, Role, User, UserStatus, admin};
use dashgate_core::UserId;

use crate::app::dto::{ChangeRoleRequest, ChangeStatusRequest, UserListResponse};
use crate::app::{AppServices, errors};
use crate::authz::require_permission;
use crate::context::CurrentUser;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", put(change_role))
        .route("/users/:id/status", put(change_status))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users - List all users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(e) = require_permission(&current, Permission::ManageUsers) {
        return errors::authz_error_to_response(e);
    }

    let items = services.identity.list_users();
    (StatusCode::OK, Json(UserListResponse { items })).into_response()
}

/// GET /admin/users/:id - Get a single user
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = require_permission(&current, Permission::ManageUsers) {
        return errors::authz_error_to_response(e);
    }

    match load_target(&services, &id) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(response) => response,
    }
}

/// PUT /admin/users/:id/role - Change a user's role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = require_permission(&current, Permission::ManageUsers) {
        return errors::authz_error_to_response(e);
    }

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let role: Role = match body.role.parse() {
        Ok(role) => role,
        Err(e) => return errors::authz_error_to_response(e),
    };
    let mut target = match load_target(&services, &id) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match admin::change_role(current.user(), &mut target, role, Utc::now()) {
        Ok(changed) => persist(&services, target, changed),
        Err(e) => errors::authz_error_to_response(e),
    }
}

/// PUT /admin/users/:id/status - Activate, deactivate or park a user
pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = require_permission(&current, Permission::ManageUsers) {
        return errors::authz_error_to_response(e);
    }

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let status: UserStatus = match body.status.parse() {
        Ok(status) => status,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", format!("{e}"));
        }
    };
    let mut target = match load_target(&services, &id) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match admin::change_status(current.user(), &mut target, status, Utc::now()) {
        Ok(changed) => persist(&services, target, changed),
        Err(e) => errors::authz_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_target(services: &AppServices, id: &str) -> Result<User, axum::response::Response> {
    let id: UserId = id
        .parse()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("{e}")))?;

    services
        .identity
        .find_user(id)
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"))
}

fn persist(services: &AppServices, user: User, changed: bool) -> axum::response::Response {
    if changed {
        if let Err(e) = services.identity.save_user(user.clone()) {
            return errors::identity_error_to_response(e);
        }
    }
    (StatusCode::OK, Json(user)).into_response()
}
