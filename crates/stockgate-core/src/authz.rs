//! Authorization engine.
//!
//! Computes allow/deny for a resolved user and a required permission.
//! Denials carry the rule that failed so callers cannot silently drop
//! them the way a missed catch block would.

use serde::{Deserialize, Serialize};

use crate::catalog::{SUB_ADMIN, WILDCARD};
use crate::models::user::User;

/// Outcome of an authorization or hierarchy check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny { reason } => Some(reason),
        }
    }
}

/// Engine configuration, constructed once at startup.
#[derive(Debug, Clone, Default)]
pub struct AuthzPolicy {
    /// Compatibility switch: grant `sub_admin` the same blanket allow
    /// as `super_admin`. Off by default — the canonical policy gives
    /// `sub_admin` only its assigned permission set.
    pub sub_admin_bypass: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AuthzEngine {
    policy: AuthzPolicy,
}

impl AuthzEngine {
    pub fn new(policy: AuthzPolicy) -> Self {
        Self { policy }
    }

    /// Decide whether `user` may perform `required`.
    ///
    /// Evaluation order is strict:
    /// 1. an explicit deny-list hit rejects, overriding everything —
    ///    including super-admin status, so a compromised super-admin
    ///    account can be locked down;
    /// 2. a `super_admin` role allows;
    /// 3. membership of `required` (or the wildcard) in the union of
    ///    role permissions and custom grants allows;
    /// 4. otherwise deny, naming the missing permission.
    ///
    /// The user's role must have been resolved by the user store. An
    /// unresolved reference and a soft-deleted role both contribute no
    /// role permissions; custom grants still count.
    pub fn authorize(&self, user: &User, required: &str) -> Decision {
        if user.denied_permissions.contains(required) {
            return Decision::deny(format!("permission {required} is explicitly banned"));
        }

        if user.is_super_admin() {
            return Decision::Allow;
        }
        if self.policy.sub_admin_bypass && user.role.name() == Some(SUB_ADMIN) {
            return Decision::Allow;
        }

        let role_permissions = user
            .role
            .role()
            .filter(|r| r.is_active)
            .map(|r| &r.permissions);
        let effective = role_permissions
            .into_iter()
            .flatten()
            .chain(&user.custom_permissions);
        for permission in effective {
            if permission == required || permission == WILDCARD {
                return Decision::Allow;
            }
        }

        Decision::deny(format!("missing required permission: {required}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SUPER_ADMIN;
    use crate::models::role::Role;
    use crate::models::user::{RoleRef, UserStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn role(name: &str, permissions: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(role: RoleRef, custom: &[&str], denied: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            name: "test".into(),
            email: "test@example.com".into(),
            role,
            custom_permissions: custom.iter().map(|p| p.to_string()).collect(),
            denied_permissions: denied.iter().map(|p| p.to_string()).collect(),
            status: UserStatus::Active,
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn resolved(r: Role) -> RoleRef {
        RoleRef::Resolved(Box::new(r))
    }

    fn engine() -> AuthzEngine {
        AuthzEngine::default()
    }

    #[test]
    fn super_admin_allows_anything() {
        let u = user(resolved(role(SUPER_ADMIN, &["*"])), &[], &[]);
        assert!(engine().authorize(&u, "role.manage").is_allowed());
        assert!(engine().authorize(&u, "made.up").is_allowed());
    }

    #[test]
    fn explicit_deny_overrides_super_admin() {
        let u = user(resolved(role(SUPER_ADMIN, &["*"])), &[], &["product.delete"]);
        let decision = engine().authorize(&u, "product.delete");
        assert!(!decision.is_allowed());
        assert!(decision.reason().unwrap().contains("explicitly banned"));
        // Everything else still allowed.
        assert!(engine().authorize(&u, "product.read").is_allowed());
    }

    #[test]
    fn role_permissions_grant_access() {
        let r = role(
            "inventory_manager",
            &[
                "product.read",
                "product.create",
                "product.update",
                "product.delete",
            ],
        );
        let u = user(resolved(r), &[], &[]);
        assert!(engine().authorize(&u, "product.create").is_allowed());
        let decision = engine().authorize(&u, "role.manage");
        assert!(!decision.is_allowed());
        assert_eq!(
            decision.reason().unwrap(),
            "missing required permission: role.manage"
        );
    }

    #[test]
    fn custom_permissions_extend_the_role() {
        let u = user(resolved(role("viewer", &["product.read"])), &["product.create"], &[]);
        assert!(engine().authorize(&u, "product.create").is_allowed());
        assert!(!engine().authorize(&u, "role.manage").is_allowed());
    }

    #[test]
    fn denied_beats_role_grant() {
        let u = user(resolved(role("viewer", &["product.read"])), &[], &["product.read"]);
        assert!(!engine().authorize(&u, "product.read").is_allowed());
    }

    #[test]
    fn wildcard_in_effective_set_allows() {
        let u = user(resolved(role("owner", &["*"])), &[], &[]);
        assert!(engine().authorize(&u, "user.delete").is_allowed());
    }

    #[test]
    fn sub_admin_has_no_blanket_bypass_by_default() {
        let u = user(resolved(role(SUB_ADMIN, &["product.read"])), &[], &[]);
        assert!(!engine().authorize(&u, "role.manage").is_allowed());
        assert!(engine().authorize(&u, "product.read").is_allowed());
    }

    #[test]
    fn sub_admin_bypass_flag_restores_blanket_allow() {
        let e = AuthzEngine::new(AuthzPolicy {
            sub_admin_bypass: true,
        });
        let u = user(resolved(role(SUB_ADMIN, &["product.read"])), &[], &[]);
        assert!(e.authorize(&u, "role.manage").is_allowed());
        // Deny still wins over the bypass.
        let banned = user(resolved(role(SUB_ADMIN, &[])), &[], &["role.manage"]);
        assert!(!e.authorize(&banned, "role.manage").is_allowed());
    }

    #[test]
    fn unresolved_role_grants_nothing_but_custom_still_counts() {
        let u = user(RoleRef::Unresolved(Uuid::new_v4()), &["product.read"], &[]);
        assert!(engine().authorize(&u, "product.read").is_allowed());
        assert!(!engine().authorize(&u, "product.create").is_allowed());
    }

    #[test]
    fn deactivated_role_grants_nothing_but_custom_still_counts() {
        let mut r = role("viewer", &["product.read", "product.update"]);
        r.is_active = false;
        let u = user(resolved(r), &["product.read"], &[]);
        assert!(engine().authorize(&u, "product.read").is_allowed());
        assert!(!engine().authorize(&u, "product.update").is_allowed());
    }
}
