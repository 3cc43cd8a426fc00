//! SurrealDB implementation of [`ProductRepository`].
//!
//! Every create and update stamps `last_updated_by` with the acting
//! user so the admin dashboard can show who touched a product last.

use chrono::{DateTime, Utc};
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::product::{CreateProduct, Product, UpdateProduct};
use stockgate_core::repository::ProductRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 40;

#[derive(Debug, SurrealValue)]
struct ProductRow {
    name: String,
    sku: String,
    quantity: i64,
    price: f64,
    category: String,
    last_updated_by: Option<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: String,
    name: String,
    sku: String,
    quantity: i64,
    price: f64,
    category: String,
    last_updated_by: Option<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_actor(value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value
        .map(|s| {
            Uuid::parse_str(&s).map_err(|e| DbError::Migration(format!("invalid actor UUID: {e}")))
        })
        .transpose()
}

impl ProductRow {
    fn into_product(self, id: Uuid) -> Result<Product, DbError> {
        Ok(Product {
            id,
            name: self.name,
            sku: self.sku,
            quantity: self.quantity,
            price: self.price,
            category: self.category,
            last_updated_by: parse_actor(self.last_updated_by)?,
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProductRowWithId {
    fn try_into_product(self) -> Result<Product, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Product {
            id,
            name: self.name,
            sku: self.sku,
            quantity: self.quantity,
            price: self.price,
            category: self.category,
            last_updated_by: parse_actor(self.last_updated_by)?,
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

fn validate_name(name: &str) -> StockgateResult<()> {
    let len = name.trim().chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(StockgateError::validation(format!(
            "product name must be between {NAME_MIN} and {NAME_MAX} characters"
        )));
    }
    Ok(())
}

/// SurrealDB implementation of the Product store.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn sku_taken(&self, sku: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM product WHERE sku = $sku")
            .bind(("sku", sku.to_string()))
            .await?;
        let rows: Vec<ProductRowWithId> = result.take(0)?;
        let exclude = exclude_id.map(|id| id.to_string());
        Ok(rows
            .iter()
            .any(|row| Some(&row.record_id) != exclude.as_ref()))
    }

    async fn fetch(&self, id: Uuid) -> Result<Product, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('product', $id) \
                 WHERE is_active != false",
            )
            .bind(("id", id_str.clone()))
            .await?;
        let rows: Vec<ProductRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;
        row.into_product(id)
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct, actor: Uuid) -> StockgateResult<Product> {
        validate_name(&input.name)?;
        if input.quantity < 0 {
            return Err(StockgateError::validation("quantity must not be negative"));
        }
        if input.price < 0.0 {
            return Err(StockgateError::validation("price must not be negative"));
        }
        let sku = normalize_sku(&input.sku);
        if sku.is_empty() {
            return Err(StockgateError::validation("sku must not be empty"));
        }
        if self.sku_taken(&sku, None).await.map_err(DbError::from)? {
            return Err(StockgateError::duplicate("product", "sku"));
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 name = $name, sku = $sku, quantity = $quantity, \
                 price = $price, category = $category, \
                 last_updated_by = $actor, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name.trim().to_string()))
            .bind(("sku", sku))
            .bind(("quantity", input.quantity))
            .bind(("price", input.price))
            .bind(("category", input.category))
            .bind(("actor", actor.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> StockgateResult<Product> {
        Ok(self.fetch(id).await?)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct, actor: Uuid) -> StockgateResult<Product> {
        self.fetch(id).await?;

        if let Some(ref name) = input.name {
            validate_name(name)?;
        }
        if input.quantity.is_some_and(|q| q < 0) {
            return Err(StockgateError::validation("quantity must not be negative"));
        }
        if input.price.is_some_and(|p| p < 0.0) {
            return Err(StockgateError::validation("price must not be negative"));
        }
        let sku = input.sku.as_deref().map(normalize_sku);
        if let Some(ref sku) = sku {
            if sku.is_empty() {
                return Err(StockgateError::validation("sku must not be empty"));
            }
            if self.sku_taken(sku, Some(id)).await.map_err(DbError::from)? {
                return Err(StockgateError::duplicate("product", "sku"));
            }
        }

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if sku.is_some() {
            sets.push("sku = $sku");
        }
        if input.quantity.is_some() {
            sets.push("quantity = $quantity");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.category.is_some() {
            sets.push("category = $category");
        }
        sets.push("last_updated_by = $actor");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('product', $id) SET {}",
            sets.join(", ")
        );

        let id_str = id.to_string();
        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("actor", actor.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name.trim().to_string()));
        }
        if let Some(sku) = sku {
            builder = builder.bind(("sku", sku));
        }
        if let Some(quantity) = input.quantity {
            builder = builder.bind(("quantity", quantity));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(category) = input.category {
            builder = builder.bind(("category", category));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn soft_delete(&self, id: Uuid) -> StockgateResult<()> {
        self.fetch(id).await?;

        self.db
            .query(
                "UPDATE type::record('product', $id) SET \
                 is_active = false, deleted_at = time::now(), \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> StockgateResult<Vec<Product>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM product \
                 WHERE is_active != false ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;
        let products = rows
            .into_iter()
            .map(|row| row.try_into_product())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(products)
    }
}
