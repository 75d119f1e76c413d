use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Catalog product. The checkout core only reads `active` and `price_cents`;
/// everything else is carried for the storefront.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub active: bool,
    pub price_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProduct {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: Option<String>,
}

/// A purchasable configuration of a product, priced as a delta against the
/// base product price.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub price_delta_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateVariant {
    pub sku: String,
    pub name: String,
    pub price_delta_cents: i64,
}

impl Product {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateProduct,
    ) -> Result<Self, sqlx::Error> {
        let currency = data.currency.clone().unwrap_or_else(|| "USD".to_string());
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO products (id, title, slug, description, price_cents, currency)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(currency)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_price(
        pool: &SqlitePool,
        id: Uuid,
        price_cents: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE products SET price_cents = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(price_cents)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_active(pool: &SqlitePool, id: Uuid, active: bool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE products SET active = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
        Ok(())
    }
}

impl Variant {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        product_id: Uuid,
        data: &CreateVariant,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO variants (id, product_id, sku, name, price_delta_cents)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(product_id)
        .bind(&data.sku)
        .bind(&data.name)
        .bind(data.price_delta_cents)
        .fetch_one(pool)
        .await
    }

    /// Resolve a variant only when it belongs to the given product.
    pub async fn find_for_product(
        pool: &SqlitePool,
        id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM variants WHERE id = $1 AND product_id = $2")
            .bind(id)
            .bind(product_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_product_id(
        pool: &SqlitePool,
        product_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM variants WHERE product_id = $1 ORDER BY created_at ASC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }
}
