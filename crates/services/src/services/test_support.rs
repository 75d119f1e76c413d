use std::sync::Mutex;

use async_trait::async_trait;
use db::{
    DBService,
    models::{
        order::Address,
        product::{CreateProduct, CreateVariant, Product, Variant},
    },
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use super::{
    checkout::BuyerInfo,
    notification::{NotifyError, OrderConfirmation, OrderNotifier},
};

/// Fresh migrated database on a temp dir. The `TempDir` must be kept alive
/// for the duration of the test.
pub async fn test_db() -> (DBService, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = DBService::new(&url).await.expect("open test database");
    (db, dir)
}

pub async fn seed_product(pool: &SqlitePool, slug: &str, price_cents: i64) -> Product {
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
    .expect("seed product")
}

pub async fn seed_variant(
    pool: &SqlitePool,
    product_id: Uuid,
    sku: &str,
    price_delta_cents: i64,
) -> Variant {
    Variant::create(
        pool,
        Uuid::new_v4(),
        product_id,
        &CreateVariant {
            sku: sku.to_string(),
            name: sku.to_string(),
            price_delta_cents,
        },
    )
    .await
    .expect("seed variant")
}

pub fn test_address() -> Address {
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

pub fn test_buyer() -> BuyerInfo {
    BuyerInfo {
        email: "ada@example.com".to_string(),
        shipping_address: test_address(),
        billing_address: test_address(),
    }
}

/// Records every confirmation it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OrderConfirmation>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<OrderConfirmation> {
        self.sent.lock().expect("notifier mutex").clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .push(confirmation.clone());
        Ok(())
    }
}

/// Always fails, for exercising the best-effort contract.
pub struct FailingNotifier;

#[async_trait]
impl OrderNotifier for FailingNotifier {
    async fn order_confirmation(&self, _: &OrderConfirmation) -> Result<(), NotifyError> {
        Err(NotifyError::Endpoint(
            "confirmation endpoint unavailable".to_string(),
        ))
    }
}
