use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::order::{PaymentMethod, PaymentStatus};

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "payment_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Wise,
    #[default]
    Manual,
    Other,
}

/// One payment attempt against an order. Multiple rows are possible on
/// retries; the order's own payment_status stays authoritative.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider: PaymentProvider,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        order_id: Uuid,
        provider: PaymentProvider,
        amount_cents: i64,
        status: PaymentStatus,
        payment_method: PaymentMethod,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO payments (id, order_id, provider, amount_cents, status, payment_method)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(order_id)
        .bind(provider)
        .bind(amount_cents)
        .bind(status)
        .bind(payment_method)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_id(
        pool: &SqlitePool,
        order_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}
