//! Minimal catalog management so the storefront has something to sell.
//! Catalog browsing and search live elsewhere.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::product::{CreateProduct, CreateVariant, Product, Variant};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, TS)]
pub struct ProductResponse {
    pub product: Product,
    pub variants: Vec<Variant>,
}

pub async fn create_product(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProductResponse>>, ApiError> {
    let product = Product::find_by_id(&state.db.pool, product_id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    let variants = Variant::find_by_product_id(&state.db.pool, product_id).await?;
    Ok(ResponseJson(ApiResponse::success(ProductResponse {
        product,
        variants,
    })))
}

pub async fn create_variant(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateVariant>,
) -> Result<ResponseJson<ApiResponse<Variant>>, ApiError> {
    Product::find_by_id(&state.db.pool, product_id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    let variant = Variant::create(&state.db.pool, Uuid::new_v4(), product_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(variant)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/products",
        Router::new()
            .route("/", post(create_product))
            .route("/{product_id}", get(get_product))
            .route("/{product_id}/variants", post(create_variant)),
    )
}
