//! Order confirmation notifier. Strictly best-effort: finalize logs a
//! failure here and moves on.

use async_trait::async_trait;
use db::models::order::PaymentMethod;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("confirmation endpoint error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("confirmation endpoint rejected the request: {0}")]
    Endpoint(String),
}

/// Payload posted to the confirmation endpoint. Field names mirror the
/// storefront's `orders-free-checkout` function.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub email: String,
    pub payment_method: PaymentMethod,
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_confirmation(&self, confirmation: &OrderConfirmation)
    -> Result<(), NotifyError>;
}

/// POSTs confirmations to the configured webhook endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    async fn order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(confirmation)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Endpoint(format!(
                "confirmation endpoint returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Used when no confirmation endpoint is configured; the confirmation is
/// only logged.
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotifyError> {
        info!(
            order_id = %confirmation.order_id,
            email = %confirmation.email,
            payment_method = %confirmation.payment_method,
            "order confirmation (no endpoint configured)"
        );
        Ok(())
    }
}
