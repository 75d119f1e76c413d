//! Price resolution against the product catalog.

use db::models::product::{Product, Variant};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    ProductNotFound(Uuid),
    #[error("variant {0} not found")]
    VariantNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct CatalogService;

impl CatalogService {
    /// Resolve the current unit price for a product, plus the variant delta
    /// when a variant is requested. An inactive product is treated the same
    /// as a missing one; a variant only resolves under its own product.
    pub async fn unit_price_cents(
        pool: &SqlitePool,
        product_id: Uuid,
        variant_id: Option<Uuid>,
    ) -> Result<i64, CatalogError> {
        let product = Product::find_by_id(pool, product_id)
            .await?
            .filter(|product| product.active)
            .ok_or(CatalogError::ProductNotFound(product_id))?;

        let mut price_cents = product.price_cents;

        if let Some(variant_id) = variant_id {
            let variant = Variant::find_for_product(pool, variant_id, product_id)
                .await?
                .ok_or(CatalogError::VariantNotFound(variant_id))?;
            price_cents += variant.price_delta_cents;
        }

        Ok(price_cents)
    }
}
