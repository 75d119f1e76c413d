use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Immutable snapshot of a cart line taken at finalize time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItem {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub currency: String,
}

impl OrderItem {
    pub async fn create_many(
        conn: &mut SqliteConnection,
        order_id: Uuid,
        items: &[CreateOrderItem],
    ) -> Result<(), sqlx::Error> {
        for item in items {
            sqlx::query(
                r#"INSERT INTO order_items (id, order_id, product_id, variant_id, qty,
                                            unit_price_cents, currency)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(item.qty)
            .bind(item.unit_price_cents)
            .bind(&item.currency)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn find_by_order_id(
        pool: &SqlitePool,
        order_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}
