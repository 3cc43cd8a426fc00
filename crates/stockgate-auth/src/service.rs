//! Email/password authentication service.

use stockgate_core::audit::AuditTrail;
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::audit::{AuditAction, CreateAuditLogEntry, RequestContext};
use stockgate_core::models::user::{User, UserStatus};
use stockgate_core::repository::{AuditLogRepository, UserRepository};

use crate::error::AuthError;
use crate::password::verify_password;

/// Verifies credentials and returns the authenticated user, with role
/// and permission overrides resolved.
pub struct AuthService<U, A>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    users: U,
    audit: AuditTrail<A>,
}

impl<U, A> AuthService<U, A>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    pub fn new(users: U, audit: AuditTrail<A>) -> Self {
        Self { users, audit }
    }

    /// Authenticate by email and password.
    ///
    /// An unknown email and a wrong password both fail with
    /// `InvalidCredentials`; the caller cannot tell which accounts
    /// exist. Suspended and soft-deleted accounts are rejected after
    /// the password check, with distinct errors. A successful login is
    /// recorded on the audit trail best-effort.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        context: RequestContext,
    ) -> StockgateResult<User> {
        let credentials = match self.users.get_credentials(email).await {
            Ok(c) => c,
            Err(StockgateError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !verify_password(password, &credentials.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = self.users.get_by_id(credentials.user_id).await?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }
        if user.status == UserStatus::Suspended {
            return Err(AuthError::AccountSuspended.into());
        }

        self.audit
            .record(CreateAuditLogEntry {
                action: AuditAction::Login,
                entity_type: "User".into(),
                entity_id: user.id,
                performed_by: user.id,
                old_value: None,
                new_value: None,
                context,
            })
            .await;

        Ok(user)
    }
}
