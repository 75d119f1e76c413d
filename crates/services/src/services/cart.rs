//! Cart Manager: owns the single active cart per owner and its lines.

use db::models::{
    cart::Cart,
    cart_item::{CartItem, CartTotals},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::catalog::{CatalogError, CatalogService};

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("cart {0} is not active")]
    CartNotActive(Uuid),
    #[error("cart item {0} not found")]
    ItemNotFound(Uuid),
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Explicit cart owner; no ambient session state. A guest carries the
/// client-held cart id, if it has one yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CartOwner {
    User(Uuid),
    Guest(Option<Uuid>),
}

pub struct CartService;

impl CartService {
    /// Return the owner's active cart, creating one if none exists. A guest
    /// cart is resumed only while still active; otherwise a fresh one is
    /// minted and the client should adopt its id.
    pub async fn get_or_create_active(
        pool: &SqlitePool,
        owner: CartOwner,
    ) -> Result<Cart, CartError> {
        match owner {
            CartOwner::User(user_id) => Ok(Cart::get_or_create_for_user(pool, user_id).await?),
            CartOwner::Guest(Some(cart_id)) => {
                if let Some(cart) = Cart::find_active_by_id(pool, cart_id).await? {
                    Ok(cart)
                } else {
                    let cart = Cart::create(pool, Uuid::new_v4(), None).await?;
                    info!(cart_id = %cart.id, stale_cart_id = %cart_id, "minted replacement guest cart");
                    Ok(cart)
                }
            }
            CartOwner::Guest(None) => {
                let cart = Cart::create(pool, Uuid::new_v4(), None).await?;
                info!(cart_id = %cart.id, "created guest cart");
                Ok(cart)
            }
        }
    }

    /// Add `qty` of a product(+variant) to the cart. An existing line for
    /// the same combination is incremented and keeps its original price
    /// snapshot; a new line snapshots the current catalog price.
    pub async fn add_item(
        pool: &SqlitePool,
        cart_id: Uuid,
        product_id: Uuid,
        variant_id: Option<Uuid>,
        qty: i64,
    ) -> Result<CartItem, CartError> {
        if qty <= 0 {
            return Err(CartError::InvalidQuantity);
        }

        Cart::find_active_by_id(pool, cart_id)
            .await?
            .ok_or(CartError::CartNotActive(cart_id))?;

        let price_cents = CatalogService::unit_price_cents(pool, product_id, variant_id).await?;

        let item = CartItem::upsert_line(
            pool,
            Uuid::new_v4(),
            cart_id,
            product_id,
            variant_id,
            qty,
            price_cents,
        )
        .await?;

        info!(
            cart_id = %cart_id,
            product_id = %product_id,
            qty = item.qty,
            "cart line added or merged"
        );
        Ok(item)
    }

    /// Set a line's quantity; zero or less removes the line.
    pub async fn update_quantity(
        pool: &SqlitePool,
        cart_id: Uuid,
        item_id: Uuid,
        new_qty: i64,
    ) -> Result<(), CartError> {
        if new_qty <= 0 {
            return Self::remove_item(pool, cart_id, item_id).await;
        }

        let touched = CartItem::set_qty_in_active_cart(pool, cart_id, item_id, new_qty).await?;
        if touched == 0 {
            return Err(CartError::ItemNotFound(item_id));
        }
        Ok(())
    }

    /// Delete a line. Already-absent lines are fine (idempotent delete).
    pub async fn remove_item(
        pool: &SqlitePool,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), CartError> {
        CartItem::delete(pool, cart_id, item_id).await?;
        Ok(())
    }

    pub async fn clear(pool: &SqlitePool, cart_id: Uuid) -> Result<(), CartError> {
        CartItem::clear_cart(pool, cart_id).await?;
        Ok(())
    }

    pub async fn items(pool: &SqlitePool, cart_id: Uuid) -> Result<Vec<CartItem>, CartError> {
        Ok(CartItem::find_by_cart_id(pool, cart_id).await?)
    }

    pub async fn totals(pool: &SqlitePool, cart_id: Uuid) -> Result<CartTotals, CartError> {
        Ok(CartItem::totals(pool, cart_id).await?)
    }

    /// Externally-driven `active -> abandoned` transition.
    pub async fn abandon(pool: &SqlitePool, cart_id: Uuid) -> Result<(), CartError> {
        if !Cart::mark_abandoned(pool, cart_id).await? {
            return Err(CartError::CartNotActive(cart_id));
        }
        info!(cart_id = %cart_id, "cart abandoned");
        Ok(())
    }
}
