//! Routes for cart management and checkout.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    cart::Cart,
    cart_item::{CartItem, CartTotals},
    order::{Address, Order, PaymentMethod},
};
use serde::{Deserialize, Serialize};
use services::services::{
    cart::{CartOwner, CartService},
    checkout::{BuyerInfo, CheckoutService},
};
use sqlx::SqlitePool;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Identifies the cart owner: a signed-in user, or a guest with the cart id
/// its client may already hold.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct GetOrCreateCartRequest {
    pub user_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CartResponse {
    pub cart: Cart,
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    #[serde(default = "default_qty")]
    pub qty: i64,
}

fn default_qty() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateQuantityRequest {
    pub qty: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CheckoutRequest {
    pub email: String,
    pub shipping_address: Address,
    /// Defaults to the shipping address ("same as shipping").
    pub billing_address: Option<Address>,
    pub payment_method: PaymentMethod,
}

async fn cart_response(pool: &SqlitePool, cart: Cart) -> Result<CartResponse, ApiError> {
    let items = CartService::items(pool, cart.id).await?;
    let totals = CartService::totals(pool, cart.id).await?;
    Ok(CartResponse { cart, items, totals })
}

pub async fn get_or_create_cart(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<GetOrCreateCartRequest>,
) -> Result<ResponseJson<ApiResponse<CartResponse>>, ApiError> {
    let owner = match payload.user_id {
        Some(user_id) => CartOwner::User(user_id),
        None => CartOwner::Guest(payload.cart_id),
    };
    let cart = CartService::get_or_create_active(&state.db.pool, owner).await?;
    let response = cart_response(&state.db.pool, cart).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CartResponse>>, ApiError> {
    let cart = Cart::find_by_id(&state.db.pool, cart_id)
        .await?
        .ok_or(ApiError::NotFound("cart"))?;
    let response = cart_response(&state.db.pool, cart).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    axum::Json(payload): axum::Json<AddItemRequest>,
) -> Result<ResponseJson<ApiResponse<CartItem>>, ApiError> {
    let item = CartService::add_item(
        &state.db.pool,
        cart_id,
        payload.product_id,
        payload.variant_id,
        payload.qty,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    axum::Json(payload): axum::Json<UpdateQuantityRequest>,
) -> Result<ResponseJson<ApiResponse<CartTotals>>, ApiError> {
    CartService::update_quantity(&state.db.pool, cart_id, item_id, payload.qty).await?;
    let totals = CartService::totals(&state.db.pool, cart_id).await?;
    Ok(ResponseJson(ApiResponse::success(totals)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<CartTotals>>, ApiError> {
    CartService::remove_item(&state.db.pool, cart_id, item_id).await?;
    let totals = CartService::totals(&state.db.pool, cart_id).await?;
    Ok(ResponseJson(ApiResponse::success(totals)))
}

pub async fn abandon_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Cart>>, ApiError> {
    CartService::abandon(&state.db.pool, cart_id).await?;
    let cart = Cart::find_by_id(&state.db.pool, cart_id)
        .await?
        .ok_or(ApiError::NotFound("cart"))?;
    Ok(ResponseJson(ApiResponse::success(cart)))
}

pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CheckoutRequest>,
) -> Result<ResponseJson<ApiResponse<Order>>, ApiError> {
    let billing_address = payload
        .billing_address
        .unwrap_or_else(|| payload.shipping_address.clone());
    let buyer = BuyerInfo {
        email: payload.email,
        shipping_address: payload.shipping_address,
        billing_address,
    };

    let order = CheckoutService::finalize(
        &state.db.pool,
        state.notifier.as_ref(),
        cart_id,
        buyer,
        payload.payment_method,
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/carts",
        Router::new()
            .route("/", post(get_or_create_cart))
            .route("/{cart_id}", get(get_cart))
            .route("/{cart_id}/items", post(add_item))
            .route(
                "/{cart_id}/items/{item_id}",
                put(update_quantity).delete(remove_item),
            )
            .route("/{cart_id}/abandon", post(abandon_cart))
            .route("/{cart_id}/checkout", post(checkout)),
    )
}
