//! Integration tests for the audit log using in-memory SurrealDB.

use serde_json::json;
use stockgate_core::audit::{AuditTrail, QUERY_LIMIT};
use stockgate_core::models::audit::{AuditAction, CreateAuditLogEntry, RequestContext};
use stockgate_core::repository::{AuditLogRepository, AuditQuery};
use stockgate_db::repository::SurrealAuditLogRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> SurrealAuditLogRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stockgate_db::run_migrations(&db).await.unwrap();
    SurrealAuditLogRepository::new(db)
}

fn entry(action: AuditAction, entity_type: &str, entity_id: Uuid) -> CreateAuditLogEntry {
    CreateAuditLogEntry {
        action,
        entity_type: entity_type.into(),
        entity_id,
        performed_by: Uuid::new_v4(),
        old_value: None,
        new_value: None,
        context: RequestContext::default(),
    }
}

#[tokio::test]
async fn append_preserves_snapshots_and_context() {
    let repo = setup().await;
    let product_id = Uuid::new_v4();
    let admin_id = Uuid::new_v4();

    let appended = repo
        .append(CreateAuditLogEntry {
            action: AuditAction::Update,
            entity_type: "Product".into(),
            entity_id: product_id,
            performed_by: admin_id,
            old_value: Some(json!({"quantity": 50})),
            new_value: Some(json!({"quantity": 45})),
            context: RequestContext {
                ip_address: Some("10.0.0.7".into()),
                user_agent: Some("stockgate-cli/1.0".into()),
            },
        })
        .await
        .unwrap();

    assert_eq!(appended.action, AuditAction::Update);
    assert_eq!(appended.entity_type, "Product");
    assert_eq!(appended.entity_id, product_id);
    assert_eq!(appended.performed_by, admin_id);
    assert_eq!(appended.old_value, Some(json!({"quantity": 50})));
    assert_eq!(appended.new_value, Some(json!({"quantity": 45})));
    assert_eq!(appended.ip_address.as_deref(), Some("10.0.0.7"));
    assert_eq!(appended.user_agent.as_deref(), Some("stockgate-cli/1.0"));
}

#[tokio::test]
async fn query_filters_combine_independently() {
    let repo = setup().await;
    let product_a = Uuid::new_v4();
    let product_b = Uuid::new_v4();

    repo.append(entry(AuditAction::Create, "Product", product_a))
        .await
        .unwrap();
    repo.append(entry(AuditAction::Update, "Product", product_b))
        .await
        .unwrap();
    repo.append(entry(AuditAction::Delete, "User", Uuid::new_v4()))
        .await
        .unwrap();

    // No filter: the full history.
    let all = repo.query(AuditQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    // Entity type alone.
    let products = repo
        .query(AuditQuery {
            entity_type: Some("Product".into()),
            entity_id: None,
        })
        .await
        .unwrap();
    assert_eq!(products.len(), 2);

    // Entity id alone.
    let for_a = repo
        .query(AuditQuery {
            entity_type: None,
            entity_id: Some(product_a),
        })
        .await
        .unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].action, AuditAction::Create);

    // Both combined.
    let combined = repo
        .query(AuditQuery {
            entity_type: Some("Product".into()),
            entity_id: Some(product_b),
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].action, AuditAction::Update);
}

#[tokio::test]
async fn query_is_newest_first_and_capped() {
    let repo = setup().await;
    let entity_id = Uuid::new_v4();

    for _ in 0..(QUERY_LIMIT + 5) {
        repo.append(entry(AuditAction::Update, "Product", entity_id))
            .await
            .unwrap();
    }

    let entries = repo.query(AuditQuery::default()).await.unwrap();
    assert_eq!(entries.len(), QUERY_LIMIT);
    for pair in entries.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn audit_trail_records_through_real_repository() {
    let repo = setup().await;
    let trail = AuditTrail::new(repo.clone());
    let user_id = Uuid::new_v4();

    trail
        .record(entry(AuditAction::Login, "User", user_id))
        .await;

    let entries = trail
        .query(AuditQuery {
            entity_type: Some("User".into()),
            entity_id: Some(user_id),
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Login);
}
