//! Request-side authorization guard.
//!
//! Handlers call this before touching the identity provider.

use dashgate_auth::{AuthzError, Permission, authorize};

use crate::context::CurrentUser;

pub fn require_permission(current: &CurrentUser, required: Permission) -> Result<(), AuthzError> {
    authorize(current.user(), required)
}
