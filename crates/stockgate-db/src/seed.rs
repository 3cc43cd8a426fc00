//! Database seeding: built-in roles, demo users and sample products.
//!
//! Safe to re-run — existing roles and users are left untouched and
//! duplicate sample products are skipped.

use std::collections::BTreeSet;
use std::sync::Arc;

use stockgate_core::catalog::{PermissionCatalog, SUB_ADMIN, SUPER_ADMIN, WILDCARD};
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::product::CreateProduct;
use stockgate_core::models::role::{CreateRole, Role};
use stockgate_core::models::user::{CreateUser, UpdateUser, User};
use stockgate_core::repository::{ProductRepository, RoleRepository, UserRepository};
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::{SurrealProductRepository, SurrealRoleRepository, SurrealUserRepository};

const SEED_PASSWORD: &str = "password123";

async fn ensure_role<R: RoleRepository>(
    repo: &R,
    name: &str,
    description: &str,
    permissions: BTreeSet<String>,
) -> StockgateResult<Role> {
    match repo.get_by_name(name).await {
        Ok(role) => Ok(role),
        Err(StockgateError::NotFound { .. }) => {
            let role = repo
                .create(CreateRole {
                    name: name.into(),
                    description: description.into(),
                    permissions,
                })
                .await?;
            info!(role = %role.name, "Seeded role");
            Ok(role)
        }
        Err(e) => Err(e),
    }
}

async fn ensure_user<U: UserRepository>(
    repo: &U,
    name: &str,
    email: &str,
    role: &Role,
) -> StockgateResult<(User, bool)> {
    match repo.get_by_email(email).await {
        Ok(user) => Ok((user, false)),
        Err(StockgateError::NotFound { .. }) => {
            let user = repo
                .create(CreateUser {
                    name: name.into(),
                    email: email.into(),
                    password: SEED_PASSWORD.into(),
                    role_id: role.id,
                })
                .await?;
            info!(user = %user.email, role = %role.name, "Seeded user");
            Ok((user, true))
        }
        Err(e) => Err(e),
    }
}

/// Provision the built-in roles, demo users and sample products.
pub async fn seed_all<C: Connection>(
    db: &Surreal<C>,
    catalog: Arc<PermissionCatalog>,
) -> StockgateResult<()> {
    let roles = SurrealRoleRepository::new(db.clone(), catalog.clone());
    let users = SurrealUserRepository::new(db.clone(), catalog.clone());
    let products = SurrealProductRepository::new(db.clone());

    let product_perms: BTreeSet<String> = catalog
        .domain_tokens("PRODUCT")
        .iter()
        .cloned()
        .collect();
    let user_perms: BTreeSet<String> = catalog.domain_tokens("USER").iter().cloned().collect();

    let super_admin = ensure_role(
        &roles,
        SUPER_ADMIN,
        "System owner with full access to everything.",
        BTreeSet::from([WILDCARD.to_string()]),
    )
    .await?;

    let sub_admin = ensure_role(
        &roles,
        SUB_ADMIN,
        "Can manage products and users, but not roles.",
        product_perms
            .iter()
            .chain(&user_perms)
            .cloned()
            .chain(["role.read".to_string()])
            .collect(),
    )
    .await?;

    let manager = ensure_role(
        &roles,
        "inventory_manager",
        "Dedicated to product stock and pricing.",
        product_perms.clone(),
    )
    .await?;

    let viewer = ensure_role(
        &roles,
        "viewer",
        "Can only view products.",
        BTreeSet::from(["product.read".to_string()]),
    )
    .await?;

    let (admin, _) = ensure_user(&users, "Sokun Super", "super@admin.com", &super_admin).await?;
    ensure_user(&users, "Dara SubAdmin", "sub@admin.com", &sub_admin).await?;
    ensure_user(&users, "Vibol Manager", "manager@securechain.com", &manager).await?;
    ensure_user(&users, "Bopha Viewer", "viewer@gmail.com", &viewer).await?;

    // A viewer with an explicit extra grant, for exercising the
    // custom-permission path end to end.
    let (intern, created) =
        ensure_user(&users, "Special Intern", "intern@securechain.com", &viewer).await?;
    if created {
        users
            .update(
                intern.id,
                UpdateUser {
                    custom_permissions: Some(BTreeSet::from(["product.create".to_string()])),
                    ..Default::default()
                },
            )
            .await?;
    }

    let samples = [
        ("Industrial Ethernet Switch", "NET-ETH-001", 50, 299.99, "Networking"),
        ("Wireless Access Point Pro", "NET-WAP-002", 30, 150.0, "Networking"),
        ("High-Speed Fiber Cable (10m)", "CAB-FIB-10M", 200, 45.5, "Cabling"),
        ("Rack Mount Server Chassis", "SRV-CHA-4U", 4, 550.0, "Hardware"),
        ("Synology NAS DiskStation", "SYN-DS-923", 25, 599.99, "Storage"),
        ("APC Smart-UPS 1500VA", "PWR-UPS-1500", 12, 450.0, "Power"),
    ];

    let mut seeded = 0usize;
    for (name, sku, quantity, price, category) in samples {
        match products
            .create(
                CreateProduct {
                    name: name.into(),
                    sku: sku.into(),
                    quantity,
                    price,
                    category: category.into(),
                },
                admin.id,
            )
            .await
        {
            Ok(_) => seeded += 1,
            Err(StockgateError::Duplicate { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    info!(count = seeded, "Seeded products");

    Ok(())
}
