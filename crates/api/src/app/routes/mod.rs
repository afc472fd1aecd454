use axum::{Router, routing::get};

pub mod admin;
pub mod auth;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .route("/me/permissions/:permission", get(system::explain_permission))
        .route("/roles", get(system::roles))
        .nest("/admin", admin::router())
}
