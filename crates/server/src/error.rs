use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{cart::CartError, catalog::CatalogError, checkout::CheckoutError};
use utils::response::ApiResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Cart(CartError::Catalog(CatalogError::ProductNotFound(_)))
            | ApiError::Cart(CartError::Catalog(CatalogError::VariantNotFound(_)))
            | ApiError::Cart(CartError::ItemNotFound(_))
            | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Cart(CartError::CartNotActive(_))
            | ApiError::Checkout(CheckoutError::CartNotActive(_)) => StatusCode::CONFLICT,
            ApiError::Cart(CartError::InvalidQuantity)
            | ApiError::Checkout(CheckoutError::EmptyCart(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Cart(CartError::Catalog(CatalogError::Database(_)))
            | ApiError::Cart(CartError::Database(_))
            | ApiError::Checkout(CheckoutError::Database(_))
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
