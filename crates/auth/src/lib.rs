//! `dashgate-auth`: role-based authorization for the admin dashboard.
//!
//! Pure policy (roles, permissions, route gating) plus the identity-provider
//! boundary and session state. No HTTP here.

pub mod admin;
pub mod authorize;
pub mod claims;
pub mod dashboard;
pub mod guard;
pub mod identity;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{
    AuthzError, authorize, authorize_role, check_minimum_role, check_permission, has_minimum_role,
    has_permission,
};
pub use claims::{
    Hs256TokenCodec, SessionClaims, TokenError, TokenValidationError, TokenValidator,
    validate_claims,
};
pub use dashboard::DashboardView;
pub use guard::{GateDecision, RouteRequirement};
pub use identity::{
    DEMO_PASSWORD, IdentityError, IdentityProvider, InMemoryIdentityProvider, LoginCredentials,
    RegisterCredentials,
};
pub use permissions::{Permission, RolePermissionMap};
pub use roles::Role;
pub use session::{AuthAction, AuthSession, AuthState};
pub use user::{User, UserStatus};
