use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AuthzError, Role};

/// Named capability a role may or may not hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Delete,
    ManageUsers,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Read,
        Permission::Write,
        Permission::Delete,
        Permission::ManageUsers,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
            Permission::ManageUsers => "manage_users",
        }
    }

    /// Human-facing label ("manage users").
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "delete" => Ok(Permission::Delete),
            "manage_users" => Ok(Permission::ManageUsers),
            other => Err(AuthzError::InvalidPermission(other.to_string())),
        }
    }
}

const VIEWER: &[Permission] = &[Permission::Read];
const EDITOR: &[Permission] = &[Permission::Read, Permission::Write];
const ADMIN: &[Permission] = &[
    Permission::Read,
    Permission::Write,
    Permission::Delete,
    Permission::ManageUsers,
];

/// Immutable role → permission table.
///
/// Each role's list is a superset of every lower role's list. Nothing in the
/// type enforces that; [`RolePermissionMap::is_monotonic`] checks it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RolePermissionMap {
    viewer: &'static [Permission],
    editor: &'static [Permission],
    admin: &'static [Permission],
}

impl RolePermissionMap {
    /// The table the dashboard ships with.
    pub const STANDARD: RolePermissionMap = RolePermissionMap {
        viewer: VIEWER,
        editor: EDITOR,
        admin: ADMIN,
    };

    /// Permissions granted to `role`, in declaration order.
    pub const fn permissions(&self, role: Role) -> &'static [Permission] {
        match role {
            Role::Viewer => self.viewer,
            Role::Editor => self.editor,
            Role::Admin => self.admin,
        }
    }

    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.permissions(role).contains(&permission)
    }

    /// True when every role holds everything held by the roles below it.
    pub fn is_monotonic(&self) -> bool {
        Role::ALL.windows(2).all(|pair| {
            let higher = self.permissions(pair[1]);
            self.permissions(pair[0]).iter().all(|p| higher.contains(p))
        })
    }
}

impl Default for RolePermissionMap {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Permissions granted to `role` by the standard table.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    RolePermissionMap::STANDARD.permissions(role)
}
