//! Best-effort audit trail.
//!
//! Wraps an [`AuditLogRepository`] so that a failed audit write never
//! blocks or rolls back the business operation that triggered it — the
//! one deliberate local-recovery case in the error design. Failures
//! are logged and suppressed.

use tracing::warn;

use crate::error::StockgateResult;
use crate::models::audit::{AuditLogEntry, CreateAuditLogEntry};
use crate::repository::{AuditLogRepository, AuditQuery};

/// Maximum number of entries a history query returns.
pub const QUERY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct AuditTrail<R: AuditLogRepository> {
    repo: R,
}

impl<R: AuditLogRepository> AuditTrail<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Record a privileged mutation. Best-effort: a repository failure
    /// is logged and swallowed.
    pub async fn record(&self, input: CreateAuditLogEntry) {
        let action = input.action;
        let entity_type = input.entity_type.clone();
        if let Err(error) = self.repo.append(input).await {
            warn!(
                action = action.as_str(),
                entity_type = %entity_type,
                error = %error,
                "failed to write audit log entry"
            );
        }
    }

    /// Entry history, newest first, capped at [`QUERY_LIMIT`].
    pub async fn query(&self, filter: AuditQuery) -> StockgateResult<Vec<AuditLogEntry>> {
        self.repo.query(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockgateError;
    use crate::models::audit::{AuditAction, RequestContext};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Repository stub whose writes always fail.
    struct FailingRepo {
        attempts: AtomicUsize,
    }

    impl AuditLogRepository for FailingRepo {
        async fn append(&self, _input: CreateAuditLogEntry) -> StockgateResult<AuditLogEntry> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StockgateError::Persistence("disk on fire".into()))
        }

        async fn query(&self, _filter: AuditQuery) -> StockgateResult<Vec<AuditLogEntry>> {
            Ok(Vec::new())
        }
    }

    fn entry() -> CreateAuditLogEntry {
        CreateAuditLogEntry {
            action: AuditAction::Update,
            entity_type: "Product".into(),
            entity_id: Uuid::new_v4(),
            performed_by: Uuid::new_v4(),
            old_value: None,
            new_value: None,
            context: RequestContext::default(),
        }
    }

    #[tokio::test]
    async fn record_swallows_repository_failures() {
        let trail = AuditTrail::new(FailingRepo {
            attempts: AtomicUsize::new(0),
        });
        // Must not panic or propagate the error.
        trail.record(entry()).await;
        assert_eq!(trail.repo.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn query_errors_still_propagate() {
        struct FailingQueryRepo;
        impl AuditLogRepository for FailingQueryRepo {
            async fn append(&self, _input: CreateAuditLogEntry) -> StockgateResult<AuditLogEntry> {
                unreachable!()
            }
            async fn query(&self, _filter: AuditQuery) -> StockgateResult<Vec<AuditLogEntry>> {
                Err(StockgateError::Persistence("query failed".into()))
            }
        }
        let trail = AuditTrail::new(FailingQueryRepo);
        assert!(trail.query(AuditQuery::default()).await.is_err());
    }
}
