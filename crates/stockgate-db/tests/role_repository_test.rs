//! Integration tests for the Role repository using in-memory SurrealDB.

use std::collections::BTreeSet;
use std::sync::Arc;

use stockgate_core::catalog::{PermissionCatalog, SUPER_ADMIN, WILDCARD};
use stockgate_core::error::StockgateError;
use stockgate_core::models::role::{CreateRole, UpdateRole};
use stockgate_core::repository::RoleRepository;
use stockgate_db::repository::SurrealRoleRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> SurrealRoleRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stockgate_db::run_migrations(&db).await.unwrap();
    SurrealRoleRepository::new(db, Arc::new(PermissionCatalog::builtin()))
}

fn perms(tokens: &[&str]) -> BTreeSet<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn create_and_get_role() {
    let repo = setup().await;

    let role = repo
        .create(CreateRole {
            name: "Inventory_Manager".into(),
            description: "Manages stock".into(),
            permissions: perms(&["product.read", "product.update"]),
        })
        .await
        .unwrap();

    // Names are normalized to trimmed lowercase.
    assert_eq!(role.name, "inventory_manager");
    assert!(role.is_active);
    assert!(role.deleted_at.is_none());
    assert_eq!(role.permissions, perms(&["product.read", "product.update"]));

    let fetched = repo.get_by_id(role.id).await.unwrap();
    assert_eq!(fetched.id, role.id);
    assert_eq!(fetched.name, "inventory_manager");

    let by_name = repo.get_by_name("INVENTORY_MANAGER").await.unwrap();
    assert_eq!(by_name.id, role.id);
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let repo = setup().await;

    repo.create(CreateRole {
        name: "viewer".into(),
        description: "".into(),
        permissions: perms(&["product.read"]),
    })
    .await
    .unwrap();

    let err = repo
        .create(CreateRole {
            name: "Viewer".into(),
            description: "case variant".into(),
            permissions: perms(&["product.read"]),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StockgateError::Duplicate { .. }));
}

#[tokio::test]
async fn unknown_permission_token_is_rejected() {
    let repo = setup().await;

    let err = repo
        .create(CreateRole {
            name: "broken".into(),
            description: "".into(),
            permissions: perms(&["product.read", "warehouse.teleport"]),
        })
        .await
        .unwrap_err();

    match err {
        StockgateError::Validation { message } => {
            assert!(message.contains("warehouse.teleport"), "{message}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn update_replaces_permission_set() {
    let repo = setup().await;

    let role = repo
        .create(CreateRole {
            name: "editor".into(),
            description: "".into(),
            permissions: perms(&["product.read", "product.update"]),
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            role.id,
            UpdateRole {
                permissions: Some(perms(&["product.read"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The new set fully replaces the old one, it does not merge.
    assert_eq!(updated.permissions, perms(&["product.read"]));
}

#[tokio::test]
async fn unknown_id_fails_not_found() {
    let repo = setup().await;

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StockgateError::NotFound { .. }));

    let err = repo
        .update(Uuid::new_v4(), UpdateRole::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StockgateError::NotFound { .. }));
}

#[tokio::test]
async fn soft_delete_deactivates_and_hides_from_list() {
    let repo = setup().await;

    let keep = repo
        .create(CreateRole {
            name: "keeper".into(),
            description: "".into(),
            permissions: perms(&["product.read"]),
        })
        .await
        .unwrap();
    let gone = repo
        .create(CreateRole {
            name: "goner".into(),
            description: "".into(),
            permissions: perms(&["product.read"]),
        })
        .await
        .unwrap();

    repo.soft_delete(gone.id).await.unwrap();

    // The record survives with its flags set.
    let deleted = repo.get_by_id(gone.id).await.unwrap();
    assert!(!deleted.is_active);
    assert!(deleted.deleted_at.is_some());

    let names: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert!(names.contains(&keep.name));
    assert!(!names.contains(&"goner".to_string()));
}

#[tokio::test]
async fn super_admin_role_cannot_be_deleted() {
    let repo = setup().await;

    let role = repo
        .create(CreateRole {
            name: SUPER_ADMIN.into(),
            description: "".into(),
            permissions: perms(&[WILDCARD]),
        })
        .await
        .unwrap();

    let err = repo.soft_delete(role.id).await.unwrap_err();
    assert!(matches!(err, StockgateError::ProtectedEntity { .. }));
}

#[tokio::test]
async fn super_admin_role_cannot_be_renamed() {
    let repo = setup().await;

    let role = repo
        .create(CreateRole {
            name: SUPER_ADMIN.into(),
            description: "".into(),
            permissions: perms(&[WILDCARD]),
        })
        .await
        .unwrap();

    let err = repo
        .update(
            role.id,
            UpdateRole {
                name: Some("root".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StockgateError::ProtectedEntity { .. }));

    // Editing the description is still allowed.
    let updated = repo
        .update(
            role.id,
            UpdateRole {
                description: Some("the boss".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "the boss");
    assert_eq!(updated.name, SUPER_ADMIN);
}
