use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Fulfilled,
    Cancelled,
    Refunded,
}

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    Failed,
    Refunded,
}

/// How the buyer chose to pay at checkout.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Bank,
}

/// Address snapshot denormalized onto the order. Field names mirror the
/// storefront checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Immutable record of a completed purchase. `total_cents` is computed once
/// at finalize and never recomputed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Order {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_cents: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[ts(type = "Address")]
    pub shipping_address: Json<Address>,
    #[ts(type = "Address")]
    pub billing_address: Json<Address>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub cart_id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_cents: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: Address,
    pub billing_address: Address,
}

impl Order {
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        data: &CreateOrder,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO orders (id, cart_id, user_id, total_cents, currency, status,
                                   payment_status, shipping_address, billing_address)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.cart_id)
        .bind(data.user_id)
        .bind(data.total_cents)
        .bind(&data.currency)
        .bind(data.status.clone())
        .bind(data.payment_status.clone())
        .bind(Json(&data.shipping_address))
        .bind(Json(&data.billing_address))
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// An order's originating cart is unique, so this finds at most one row.
    pub async fn find_by_cart_id(
        pool: &SqlitePool,
        cart_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM orders WHERE cart_id = $1")
            .bind(cart_id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{models::cart::Cart, test_utils::test_db};

    fn test_address() -> Address {
        Address {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "E1 6AN".to_string(),
            country: "GB".to_string(),
        }
    }

    fn create_order_data(cart_id: Uuid) -> CreateOrder {
        CreateOrder {
            cart_id,
            user_id: None,
            total_cents: 4500,
            currency: "USD".to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address: test_address(),
            billing_address: test_address(),
        }
    }

    #[tokio::test]
    async fn create_round_trips_address_snapshots() {
        let (db, _dir) = test_db().await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        let order = Order::create(&db.pool, Uuid::new_v4(), &create_order_data(cart.id))
            .await
            .unwrap();

        let reloaded = Order::find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_cents, 4500);
        assert_eq!(reloaded.shipping_address.0, test_address());
        assert_eq!(reloaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn rolled_back_transaction_leaves_no_order() {
        let (db, _dir) = test_db().await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        let mut tx = db.pool.begin().await.unwrap();
        let order = Order::create(&mut *tx, Uuid::new_v4(), &create_order_data(cart.id))
            .await
            .unwrap();
        drop(tx); // implicit rollback

        assert!(Order::find_by_id(&db.pool, order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn one_order_per_cart() {
        let (db, _dir) = test_db().await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        Order::create(&db.pool, Uuid::new_v4(), &create_order_data(cart.id))
            .await
            .unwrap();
        let second = Order::create(&db.pool, Uuid::new_v4(), &create_order_data(cart.id)).await;

        assert!(second.is_err());
    }
}
