//! Read-only order routes.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{order::Order, order_item::OrderItem, payment::Payment};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, TS)]
pub struct OrderResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderResponse>>, ApiError> {
    let order = Order::find_by_id(&state.db.pool, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    let items = OrderItem::find_by_order_id(&state.db.pool, order_id).await?;
    let payments = Payment::find_by_order_id(&state.db.pool, order_id).await?;

    Ok(ResponseJson(ApiResponse::success(OrderResponse {
        order,
        items,
        payments,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/orders/{order_id}", get(get_order))
}
