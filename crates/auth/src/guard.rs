//! Protected-route gate.

use serde::{Deserialize, Serialize};

use crate::authorize::{authorize, authorize_role};
use crate::session::AuthState;
use crate::{AuthzError, Permission, Role};

/// What a route asks of the signed-in user. Both checks are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequirement {
    pub required_role: Option<Role>,
    pub required_permission: Option<Permission>,
}

impl RouteRequirement {
    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            required_permission: None,
        }
    }

    pub fn permission(permission: Permission) -> Self {
        Self {
            required_role: None,
            required_permission: Some(permission),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving; render a spinner.
    Loading,
    /// Nobody signed in; send to the sign-in page.
    Unauthenticated,
    Denied(AuthzError),
    Granted,
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }
}

/// Decide whether the current session may render a route.
///
/// Checked in order: loading, signed-in user, role, permission.
pub fn evaluate(state: &AuthState, requirement: &RouteRequirement) -> GateDecision {
    if state.is_loading {
        return GateDecision::Loading;
    }

    let Some(user) = state.user.as_ref() else {
        return GateDecision::Unauthenticated;
    };

    if let Some(role) = requirement.required_role {
        if let Err(err) = authorize_role(user, role) {
            return GateDecision::Denied(err);
        }
    }

    if let Some(permission) = requirement.required_permission {
        if let Err(err) = authorize(user, permission) {
            return GateDecision::Denied(err);
        }
    }

    GateDecision::Granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AuthAction, reduce};
    use crate::{User, UserStatus};
    use chrono::Utc;
    use dashgate_core::UserId;

    fn signed_in(role: Role) -> AuthState {
        let user = User::new(
            UserId::new(),
            "u@example.com",
            "U",
            "Ser",
            role,
            UserStatus::Active,
            Utc::now(),
        );
        reduce(AuthState::default(), AuthAction::LoginSuccess(user))
    }

    #[test]
    fn loading_wins_over_everything() {
        let decision = evaluate(&AuthState::default(), &RouteRequirement::role(Role::Admin));
        assert_eq!(decision, GateDecision::Loading);
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        let state = reduce(AuthState::default(), AuthAction::SetLoading(false));
        assert_eq!(evaluate(&state, &RouteRequirement::default()), GateDecision::Unauthenticated);
    }

    #[test]
    fn no_requirement_admits_any_user() {
        assert!(evaluate(&signed_in(Role::Viewer), &RouteRequirement::default()).is_granted());
    }

    #[test]
    fn role_requirement() {
        let requirement = RouteRequirement::role(Role::Editor);
        assert!(evaluate(&signed_in(Role::Admin), &requirement).is_granted());
        assert!(evaluate(&signed_in(Role::Editor), &requirement).is_granted());
        assert_eq!(
            evaluate(&signed_in(Role::Viewer), &requirement),
            GateDecision::Denied(AuthzError::InsufficientRole {
                required: Role::Editor,
                actual: Role::Viewer
            })
        );
    }

    #[test]
    fn permission_requirement() {
        let requirement = RouteRequirement::permission(Permission::ManageUsers);
        assert!(evaluate(&signed_in(Role::Admin), &requirement).is_granted());
        assert_eq!(
            evaluate(&signed_in(Role::Editor), &requirement),
            GateDecision::Denied(AuthzError::Forbidden(Permission::ManageUsers))
        );
    }

    #[test]
    fn role_is_checked_before_permission() {
        let requirement = RouteRequirement {
            required_role: Some(Role::Admin),
            required_permission: Some(Permission::Write),
        };
        assert!(matches!(
            evaluate(&signed_in(Role::Viewer), &requirement),
            GateDecision::Denied(AuthzError::InsufficientRole { .. })
        ));
    }
}
