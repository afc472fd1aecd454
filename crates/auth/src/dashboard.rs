//! Per-user dashboard summary.

use serde::Serialize;

use crate::{Permission, Role, User, authorize::has_permission};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Standard,
    Medium,
    High,
}

impl From<Role> for SecurityLevel {
    fn from(role: Role) -> Self {
        match role {
            Role::Viewer => SecurityLevel::Standard,
            Role::Editor => SecurityLevel::Medium,
            Role::Admin => SecurityLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionBadge {
    pub permission: Permission,
    pub label: String,
}

/// What the dashboard shows the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub greeting_name: String,
    pub role: Role,
    pub security_level: SecurityLevel,
    pub permissions: Vec<PermissionBadge>,
    pub permission_count: usize,
    pub can_manage_users: bool,
    /// Shown instead of the user-management panel.
    pub limited_access: bool,
}

impl DashboardView {
    pub fn for_user(user: &User) -> Self {
        let permissions: Vec<PermissionBadge> = user
            .permissions()
            .iter()
            .map(|p| PermissionBadge {
                permission: *p,
                label: p.label(),
            })
            .collect();
        let can_manage_users = has_permission(user.role, Permission::ManageUsers);

        Self {
            greeting_name: user.first_name.clone(),
            role: user.role,
            security_level: user.role.into(),
            permission_count: permissions.len(),
            permissions,
            can_manage_users,
            limited_access: !can_manage_users,
        }
    }
}
