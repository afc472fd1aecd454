//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use chrono::Utc;

use dashgate_auth::{Hs256TokenCodec, IdentityError, IdentityProvider, InMemoryIdentityProvider};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared handles for handlers.
#[derive(Clone)]
pub struct AppServices {
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: Arc<Hs256TokenCodec>,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails only if seeding the demo accounts cannot hash their passwords.
pub fn build_app(config: &ApiConfig) -> Result<Router, IdentityError> {
    let identity: Arc<dyn IdentityProvider> = if config.seed_demo_users {
        Arc::new(InMemoryIdentityProvider::with_demo_users(Utc::now())?)
    } else {
        Arc::new(InMemoryIdentityProvider::new())
    };
    let tokens = Arc::new(Hs256TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.session_ttl,
    ));

    Ok(build_app_with(AppServices { identity, tokens }))
}

pub fn build_app_with(services: AppServices) -> Router {
    let auth_layer = middleware::AuthLayer {
        tokens: services.tokens.clone(),
        identity: services.identity.clone(),
    };

    // Protected routes: require a valid session token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_layer,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router())
        .merge(protected)
        .layer(Extension(Arc::new(services)))
}
