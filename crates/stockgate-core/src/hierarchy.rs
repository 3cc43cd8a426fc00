//! Hierarchy guard.
//!
//! Decides whether an acting admin may modify a target user, based on
//! relative role rank (super_admin > sub_admin > everything else).
//! This runs before the authorization engine's permission check on
//! user-management operations; both must pass.

use crate::authz::Decision;
use crate::catalog::SUPER_ADMIN;
use crate::models::role::Role;
use crate::models::user::User;

/// The role assignment contained in a requested user edit, if any.
/// The caller resolves the role id to its name before consulting the
/// guard.
#[derive(Debug, Clone, Default)]
pub struct RequestedChange {
    pub new_role_name: Option<String>,
}

impl RequestedChange {
    /// A change that does not touch the target's role.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn assign_role(role: &Role) -> Self {
        Self {
            new_role_name: Some(role.name.clone()),
        }
    }
}

/// Whether `acting` may apply `change` to `target`.
///
/// Super admins bypass every rule. For everyone else, in order:
/// the target must not be a super admin, must not share the acting
/// admin's role, and the change must not assign the super_admin role.
/// Denial reasons name the rule, never the target's attribute values.
pub fn can_modify(acting: &User, target: &User, change: &RequestedChange) -> Decision {
    if acting.is_super_admin() {
        return Decision::Allow;
    }

    if target.is_super_admin() {
        return Decision::deny("cannot modify a super admin");
    }

    let acting_role = acting.role.name();
    if acting_role.is_some() && target.role.name() == acting_role {
        return Decision::deny("cannot modify a user of the same rank");
    }

    if change.new_role_name.as_deref() == Some(SUPER_ADMIN) {
        return Decision::deny("only super admins may grant the super admin role");
    }

    Decision::Allow
}
