//! Order Finalizer: converts an active, non-empty cart into an immutable
//! order in one all-or-nothing storage transaction.

use db::models::{
    cart::{Cart, CartStatus},
    cart_item::CartItem,
    order::{Address, CreateOrder, Order, OrderStatus, PaymentMethod, PaymentStatus},
    order_item::{CreateOrderItem, OrderItem},
    payment::{Payment, PaymentProvider},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::notification::{OrderConfirmation, OrderNotifier};

const CURRENCY: &str = "USD";

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart {0} is not active")]
    CartNotActive(Uuid),
    #[error("cart {0} is empty")]
    EmptyCart(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Buyer details captured by the checkout form; addresses are denormalized
/// onto the order as snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BuyerInfo {
    pub email: String,
    pub shipping_address: Address,
    pub billing_address: Address,
}

pub struct CheckoutService;

impl CheckoutService {
    /// Finalize the cart into an order.
    ///
    /// The order total is the sum of the frozen line snapshots; live catalog
    /// prices are not consulted. The cart transition, the order, its items
    /// and the initial payment commit as one unit: on any failure the cart
    /// stays `active` and finalize may be retried. A cart that is already
    /// `ordered` fails with `CartNotActive` instead of producing a second
    /// order.
    pub async fn finalize(
        pool: &SqlitePool,
        notifier: &dyn OrderNotifier,
        cart_id: Uuid,
        buyer: BuyerInfo,
        payment_method: PaymentMethod,
    ) -> Result<Order, CheckoutError> {
        let cart = Cart::find_by_id(pool, cart_id)
            .await?
            .filter(|cart| cart.status == CartStatus::Active)
            .ok_or(CheckoutError::CartNotActive(cart_id))?;

        let items = CartItem::find_by_cart_id(pool, cart_id).await?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart(cart_id));
        }

        let total_cents: i64 = items
            .iter()
            .map(|item| item.qty * item.price_cents_snapshot)
            .sum();

        let payment_status = match payment_method {
            PaymentMethod::Cod => PaymentStatus::Pending,
            PaymentMethod::Bank => PaymentStatus::Authorized,
        };

        let mut tx = pool.begin().await?;

        // Guarded transition first: a concurrent or repeated finalize shows
        // up here as zero rows, not as a unique-constraint error later.
        if !Cart::mark_ordered(&mut *tx, cart_id).await? {
            return Err(CheckoutError::CartNotActive(cart_id));
        }

        let order = Order::create(
            &mut *tx,
            Uuid::new_v4(),
            &CreateOrder {
                cart_id,
                user_id: cart.user_id,
                total_cents,
                currency: CURRENCY.to_string(),
                status: OrderStatus::Pending,
                payment_status: payment_status.clone(),
                shipping_address: buyer.shipping_address.clone(),
                billing_address: buyer.billing_address.clone(),
            },
        )
        .await?;

        let order_items: Vec<CreateOrderItem> = items
            .iter()
            .map(|item| CreateOrderItem {
                product_id: item.product_id,
                variant_id: item.variant_id,
                qty: item.qty,
                unit_price_cents: item.price_cents_snapshot,
                currency: CURRENCY.to_string(),
            })
            .collect();
        OrderItem::create_many(&mut *tx, order.id, &order_items).await?;

        Payment::create(
            &mut *tx,
            Uuid::new_v4(),
            order.id,
            PaymentProvider::Manual,
            total_cents,
            payment_status,
            payment_method,
        )
        .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            cart_id = %cart_id,
            total_cents,
            "order finalized"
        );

        // Post-commit: drop the ordered cart's lines so a stale client does
        // not resubmit them. The order already exists either way.
        if let Err(error) = CartItem::clear_cart(pool, cart_id).await {
            warn!(cart_id = %cart_id, %error, "failed to clear cart lines after finalize");
        }

        let confirmation = OrderConfirmation {
            order_id: order.id,
            email: buyer.email.clone(),
            payment_method,
        };
        if let Err(error) = notifier.order_confirmation(&confirmation).await {
            warn!(order_id = %order.id, %error, "order confirmation notification failed");
        }

        Ok(order)
    }
}
