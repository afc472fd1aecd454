//! User administration decisions.
//!
//! Pure functions: they check the actor, mutate the target record in place
//! and leave persistence to the identity provider.

use chrono::{DateTime, Utc};

use crate::authorize::authorize;
use crate::{AuthzError, Permission, Role, User, UserStatus};

fn ensure_can_manage(actor: &User, target: &User) -> Result<(), AuthzError> {
    authorize(actor, Permission::ManageUsers)?;
    if actor.id == target.id {
        return Err(AuthzError::SelfModification);
    }
    Ok(())
}

/// Assign `role` to `target` on behalf of `actor`.
///
/// Returns whether the record changed.
pub fn change_role(
    actor: &User,
    target: &mut User,
    role: Role,
    now: DateTime<Utc>,
) -> Result<bool, AuthzError> {
    ensure_can_manage(actor, target)?;
    if target.role == role {
        return Ok(false);
    }

    tracing::info!(
        actor = %actor.id,
        target = %target.id,
        from = %target.role,
        to = %role,
        "role changed"
    );
    target.role = role;
    target.updated_at = now;
    Ok(true)
}

/// Set `target`'s account status on behalf of `actor`.
pub fn change_status(
    actor: &User,
    target: &mut User,
    status: UserStatus,
    now: DateTime<Utc>,
) -> Result<bool, AuthzError> {
    ensure_can_manage(actor, target)?;
    if target.status == status {
        return Ok(false);
    }

    tracing::info!(
        actor = %actor.id,
        target = %target.id,
        from = %target.status,
        to = %status,
        "status changed"
    );
    target.status = status;
    target.updated_at = now;
    Ok(true)
}
