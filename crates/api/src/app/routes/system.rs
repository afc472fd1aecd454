use axum::{Extension, Json, extract::Path, http::StatusCode, response::IntoResponse};

use dashgate_auth::{
    DashboardView, Permission,
    authorize::{explain_authorization, role_catalog},
};

use crate::app::{dto::MeResponse, errors};
use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /me - Signed-in user plus their dashboard summary
pub async fn me(Extension(current): Extension<CurrentUser>) -> impl IntoResponse {
    let user = current.user().clone();
    let dashboard = DashboardView::for_user(&user);
    Json(MeResponse { user, dashboard })
}

/// GET /me/permissions/:permission - Why the current user does or does not hold a permission
pub async fn explain_permission(
    Extension(current): Extension<CurrentUser>,
    Path(permission): Path<String>,
) -> axum::response::Response {
    let permission: Permission = match permission.parse() {
        Ok(p) => p,
        Err(e) => return errors::authz_error_to_response(e),
    };
    Json(explain_authorization(current.user(), permission)).into_response()
}

/// GET /roles - Role catalog (levels and permissions)
pub async fn roles() -> impl IntoResponse {
    Json(serde_json::json!({ "items": role_catalog() }))
}
