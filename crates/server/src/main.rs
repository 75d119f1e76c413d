use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use db::DBService;
use services::services::notification::{LogNotifier, OrderNotifier, WebhookNotifier};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://novamart.db".to_string());
    let db = DBService::new(&database_url).await?;

    let notifier: Arc<dyn OrderNotifier> = match std::env::var("CONFIRMATION_WEBHOOK_URL") {
        Ok(endpoint) => {
            info!(%endpoint, "order confirmations go to webhook");
            Arc::new(WebhookNotifier::new(endpoint))
        }
        Err(_) => Arc::new(LogNotifier),
    };

    let state = AppState { db, notifier };

    let app = Router::new()
        .merge(routes::carts::router())
        .merge(routes::orders::router())
        .merge(routes::products::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
