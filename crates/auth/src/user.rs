//! User records as issued by the identity provider.
//!
//! The authorization model only reads these; role and status changes go
//! through [`crate::admin`] and are persisted by the provider.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dashgate_core::{DomainError, UserId};

use crate::permissions::permissions_for;
use crate::{Permission, Role};

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User can sign in.
    #[default]
    Active,
    /// Disabled by an administrator.
    Inactive,
    /// Awaiting approval.
    Pending,
}

impl UserStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "pending" => Ok(UserStatus::Pending),
            other => Err(DomainError::validation(format!("unknown user status '{other}'"))),
        }
    }
}

/// Identity record with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
        status: UserStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            status,
            created_at,
            updated_at: created_at,
            last_login: None,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Uppercased first letters of first and last name ("AU" for Admin User).
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn permissions(&self) -> &'static [Permission] {
        permissions_for(self.role)
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            UserId::new(),
            "editor@example.com",
            "editor",
            "smith",
            Role::Editor,
            UserStatus::Active,
            Utc::now(),
        )
    }

    #[test]
    fn names_and_initials() {
        let user = sample();
        assert_eq!(user.display_name(), "editor smith");
        assert_eq!(user.initials(), "ES");
    }

    #[test]
    fn initials_tolerate_empty_names() {
        let mut user = sample();
        user.last_name.clear();
        assert_eq!(user.initials(), "E");
    }

    #[test]
    fn permissions_follow_role() {
        let mut user = sample();
        assert_eq!(user.permissions(), &[Permission::Read, Permission::Write]);
        user.role = Role::Viewer;
        assert_eq!(user.permissions(), &[Permission::Read]);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [UserStatus::Active, UserStatus::Inactive, UserStatus::Pending] {
            assert_eq!(status.as_str().parse::<UserStatus>().unwrap(), status);
        }
        assert!("banned".parse::<UserStatus>().is_err());
    }

    #[test]
    fn json_shape() {
        let user = sample();
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "editor");
        assert_eq!(value["status"], "active");
        assert!(value.get("last_login").is_none());

        let back: User = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }
}
