use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "cart_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
    Ordered,
    Abandoned,
}

/// Mutable pre-order cart. `user_id` is NULL for guest carts, which the
/// client tracks by cart id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_by_id(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM carts WHERE id = $1 AND status = 'active'")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_by_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM carts WHERE user_id = $1 AND status = 'active'")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO carts (id, user_id, status)
               VALUES ($1, $2, 'active')
               RETURNING *"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Return the user's active cart, creating one if none exists. The
    /// partial unique index on (user_id) WHERE status = 'active' makes
    /// concurrent creators converge on a single row.
    pub async fn get_or_create_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO carts (id, user_id, status)
               VALUES ($1, $2, 'active')
               ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(pool)
        .await?;

        Self::find_active_by_user(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Transition `active -> ordered`. Returns false if the cart was not
    /// active, which is the double-submit signal during finalize.
    pub async fn mark_ordered<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE carts
               SET status = 'ordered', updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'active'"#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Externally-driven transition `active -> abandoned`.
    pub async fn mark_abandoned(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE carts
               SET status = 'abandoned', updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'active'"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{models::cart_item::CartItem, test_utils::test_db};

    #[tokio::test]
    async fn get_or_create_reuses_active_cart() {
        let (db, _dir) = test_db().await;
        let user_id = Uuid::new_v4();

        let first = Cart::get_or_create_for_user(&db.pool, user_id)
            .await
            .unwrap();
        let second = Cart::get_or_create_for_user(&db.pool, user_id)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, CartStatus::Active);
    }

    #[tokio::test]
    async fn ordered_cart_is_not_reused() {
        let (db, _dir) = test_db().await;
        let user_id = Uuid::new_v4();

        let first = Cart::get_or_create_for_user(&db.pool, user_id)
            .await
            .unwrap();
        assert!(Cart::mark_ordered(&db.pool, first.id).await.unwrap());

        let second = Cart::get_or_create_for_user(&db.pool, user_id)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn mark_ordered_is_guarded() {
        let (db, _dir) = test_db().await;
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();

        assert!(Cart::mark_ordered(&db.pool, cart.id).await.unwrap());
        assert!(!Cart::mark_ordered(&db.pool, cart.id).await.unwrap());

        let reloaded = Cart::find_by_id(&db.pool, cart.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, CartStatus::Ordered);
    }

    #[tokio::test]
    async fn delete_cascades_to_items() {
        let (db, _dir) = test_db().await;
        let product = crate::models::product::Product::create(
            &db.pool,
            Uuid::new_v4(),
            &crate::models::product::CreateProduct {
                title: "Desk Lamp".to_string(),
                slug: "desk-lamp".to_string(),
                description: None,
                price_cents: 1500,
                currency: None,
            },
        )
        .await
        .unwrap();
        let cart = Cart::create(&db.pool, Uuid::new_v4(), None).await.unwrap();
        CartItem::upsert_line(&db.pool, Uuid::new_v4(), cart.id, product.id, None, 1, 1500)
            .await
            .unwrap();

        assert_eq!(Cart::delete(&db.pool, cart.id).await.unwrap(), 1);
        let items = CartItem::find_by_cart_id(&db.pool, cart.id).await.unwrap();
        assert!(items.is_empty());
    }
}
