use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One product(+variant) line in a cart. `price_cents_snapshot` is frozen
/// when the line is first created and is never refreshed by repeat adds.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub qty: i64,
    pub price_cents_snapshot: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived cart totals; computed by SUM, never stored.
#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize, TS)]
pub struct CartTotals {
    pub total_items: i64,
    pub total_price_cents: i64,
}

impl CartItem {
    pub async fn find_by_cart_id(
        pool: &SqlitePool,
        cart_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY created_at ASC",
        )
        .bind(cart_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM cart_items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a line, or fold into the existing (cart, product, variant)
    /// line by incrementing its quantity. The DO UPDATE arm deliberately
    /// leaves `price_cents_snapshot` untouched: the snapshot is fixed at
    /// first add.
    pub async fn upsert_line(
        pool: &SqlitePool,
        id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
        variant_id: Option<Uuid>,
        qty: i64,
        price_cents_snapshot: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO cart_items (id, cart_id, product_id, variant_id, qty, price_cents_snapshot)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (cart_id, product_id, coalesce(variant_id, '')) DO UPDATE SET
                   qty = qty + excluded.qty,
                   updated_at = CURRENT_TIMESTAMP
               RETURNING *"#,
        )
        .bind(id)
        .bind(cart_id)
        .bind(product_id)
        .bind(variant_id)
        .bind(qty)
        .bind(price_cents_snapshot)
        .fetch_one(pool)
        .await
    }

    /// Set a line's quantity, but only while the owning cart is active.
    /// Returns the number of rows touched (0 = no such live line).
    pub async fn set_qty_in_active_cart(
        pool: &SqlitePool,
        cart_id: Uuid,
        item_id: Uuid,
        qty: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE cart_items
               SET qty = $3, updated_at = CURRENT_TIMESTAMP
               WHERE id = $2
                 AND cart_id = $1
                 AND EXISTS (SELECT 1 FROM carts WHERE id = $1 AND status = 'active')"#,
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(qty)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(
        pool: &SqlitePool,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $2 AND cart_id = $1")
            .bind(cart_id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn clear_cart<'e, E>(executor: E, cart_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn totals(pool: &SqlitePool, cart_id: Uuid) -> Result<CartTotals, sqlx::Error> {
        sqlx::query_as::<_, CartTotals>(
            r#"SELECT
                   COALESCE(SUM(qty), 0)                        AS total_items,
                   COALESCE(SUM(qty * price_cents_snapshot), 0) AS total_price_cents
               FROM cart_items
               WHERE cart_id = $1"#,
        )
        .bind(cart_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        models::{
            cart::Cart,
            product::{CreateProduct, Product},
        },
        test_utils::test_db,
    };

    async fn seed_product(pool: &SqlitePool, slug: &str, price_cents: i64) -> Product {
        Product::create(
            pool,
            Uuid::new_v4(),
            &CreateProduct {
                title: slug.to_string(),
                slug: slug.to_string(),
                description: None,
                price_cents,
                currency: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_merges_same_line() {
        let (db, _dir) = test_db().await;
        let product = seed_product(&db.pool, "mug", 900).await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, product.id, None, 1, 900)
            .await
            .unwrap();
        let merged =
            CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, product.id, None, 1, 950)
                .await
                .unwrap();

        let items = CartItem::find_by_cart_id(&db.pool, cart.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(merged.qty, 2);
        // Snapshot stays as captured by the first add.
        assert_eq!(merged.price_cents_snapshot, 900);
    }

    #[tokio::test]
    async fn distinct_variants_get_distinct_lines() {
        let (db, _dir) = test_db().await;
        let product = seed_product(&db.pool, "tee", 2000).await;
        let variant = crate::models::product::Variant::create(
            &db.pool,
            Uuid::new_v4(),
            product.id,
            &crate::models::product::CreateVariant {
                sku: "tee-xl".to_string(),
                name: "XL".to_string(),
                price_delta_cents: 200,
            },
        )
        .await
        .unwrap();
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, product.id, None, 1, 2000)
            .await
            .unwrap();
        CartItem::upsert_line(
            &db.pool,
            Uuid::new_v4(),
            cart.id,
            product.id,
            Some(variant.id),
            1,
            2200,
        )
        .await
        .unwrap();

        let items = CartItem::find_by_cart_id(&db.pool, cart.id).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn qty_update_requires_active_cart() {
        let (db, _dir) = test_db().await;
        let product = seed_product(&db.pool, "poster", 500).await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();
        let item =
            CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, product.id, None, 1, 500)
                .await
                .unwrap();

        assert!(Cart::mark_ordered(&db.pool, cart.id).await.unwrap());

        let touched = CartItem::set_qty_in_active_cart(&db.pool, cart.id, item.id, 3)
            .await
            .unwrap();
        assert_eq!(touched, 0);
    }

    #[tokio::test]
    async fn totals_sum_over_lines() {
        let (db, _dir) = test_db().await;
        let a = seed_product(&db.pool, "a", 1000).await;
        let b = seed_product(&db.pool, "b", 2500).await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, a.id, None, 2, 1000)
            .await
            .unwrap();
        CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, b.id, None, 1, 2500)
            .await
            .unwrap();

        let totals = CartItem::totals(&db.pool, cart.id).await.unwrap();
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.total_price_cents, 4500);
    }
}
