use serde::Serialize;
use thiserror::Error;

use dashgate_core::UserId;

use crate::permissions::{RolePermissionMap, permissions_for};
use crate::{Permission, Role, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid role '{0}'")]
    InvalidRole(String),

    #[error("invalid permission '{0}'")]
    InvalidPermission(String),

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error("forbidden: role '{actual}' is below required role '{required}'")]
    InsufficientRole { required: Role, actual: Role },

    #[error("users cannot change their own role or status")]
    SelfModification,
}

/// Is `user_role` at least as privileged as `required`?
pub fn has_minimum_role(user_role: Role, required: Role) -> bool {
    user_role.level() >= required.level()
}

/// Does `role` hold `permission` under the standard table?
pub fn has_permission(role: Role, permission: Permission) -> bool {
    RolePermissionMap::STANDARD.grants(role, permission)
}

/// String-facing variant of [`has_minimum_role`].
///
/// Names outside the closed role set are rejected, never defaulted.
pub fn check_minimum_role(user_role: &str, required: &str) -> Result<bool, AuthzError> {
    Ok(has_minimum_role(user_role.parse()?, required.parse()?))
}

/// String-facing variant of [`has_permission`].
pub fn check_permission(role: &str, permission: &str) -> Result<bool, AuthzError> {
    Ok(has_permission(role.parse()?, permission.parse()?))
}

/// Lowest role that holds `permission`, if any does.
pub fn lowest_role_with(permission: Permission) -> Option<Role> {
    Role::ALL.into_iter().find(|role| has_permission(*role, permission))
}

/// Authorize `user` for an action requiring `required`.
///
/// - No IO
/// - No panics
/// - Reads the user record, never mutates it
pub fn authorize(user: &User, required: Permission) -> Result<(), AuthzError> {
    if has_permission(user.role, required) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            permission = %required,
            "permission denied"
        );
        Err(AuthzError::Forbidden(required))
    }
}

/// Authorize `user` for an area gated on a minimum role.
pub fn authorize_role(user: &User, required: Role) -> Result<(), AuthzError> {
    if has_minimum_role(user.role, required) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            required = %required,
            "role too low"
        );
        Err(AuthzError::InsufficientRole {
            required,
            actual: user.role,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a permission check was (or would be) granted or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: Permission,
    pub granted: bool,
    pub reason: String,
    pub user_id: UserId,
    pub role: Role,
    pub effective_permissions: Vec<Permission>,
    pub denial: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub message: String,
    /// Lowest role that would grant the permission.
    pub minimum_role: Option<Role>,
    pub suggestions: Vec<String>,
}

pub fn explain_authorization(user: &User, required: Permission) -> AuthorizationExplanation {
    let effective_permissions = permissions_for(user.role).to_vec();

    if has_permission(user.role, required) {
        return AuthorizationExplanation {
            required_permission: required,
            granted: true,
            reason: format!("role '{}' grants '{}'", user.role, required),
            user_id: user.id,
            role: user.role,
            effective_permissions,
            denial: None,
        };
    }

    let minimum_role = lowest_role_with(required);
    let mut suggestions = Vec::new();
    if let Some(role) = minimum_role {
        suggestions.push(format!("Ask an administrator for the '{role}' role"));
    }

    AuthorizationExplanation {
        required_permission: required,
        granted: false,
        reason: format!(
            "role '{}' does not grant '{}'. Current permissions: {:?}",
            user.role,
            required,
            effective_permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>()
        ),
        user_id: user.id,
        role: user.role,
        effective_permissions,
        denial: Some(DenialReason {
            message: format!("Missing required permission: '{required}'"),
            minimum_role,
            suggestions,
        }),
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub level: u8,
    pub permissions: Vec<Permission>,
    pub description: &'static str,
}

/// Every role with its level and permissions, least privileged first.
pub fn role_catalog() -> Vec<RoleDefinition> {
    Role::ALL
        .into_iter()
        .map(|role| RoleDefinition {
            name: role,
            level: role.level(),
            permissions: permissions_for(role).to_vec(),
            description: role.description(),
        })
        .collect()
}
