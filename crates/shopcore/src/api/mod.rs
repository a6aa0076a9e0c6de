//! REST API for the storefront Web App and the catalog wizard
//!
//! Catalog, cart and order endpoints over the SQLite store, plus a proxy for
//! Telegram-hosted pictures. Errors are rendered as `{"error": "..."}` by
//! [`AppError`](crate::core::error::AppError).

use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::notifications::OrderNotifier;
use crate::storage::db::DbPool;

pub mod cart;
pub mod catalog;
pub mod media;
pub mod orders;

pub use media::{MediaSource, MediaStream, UnavailableMedia};

/// Shared state handed to every handler
pub struct ApiState {
    pub db_pool: Arc<DbPool>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub media: Arc<dyn MediaSource>,
}

impl ApiState {
    pub fn new(db_pool: Arc<DbPool>, notifier: Arc<dyn OrderNotifier>, media: Arc<dyn MediaSource>) -> Self {
        Self {
            db_pool,
            notifier,
            media,
        }
    }
}

/// Builds the API router
pub fn create_router(state: ApiState) -> Router {
    // The storefront is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route("/products/{id}", get(catalog::get_product).delete(catalog::delete_product))
        .route("/categories", get(catalog::list_categories).post(catalog::create_category))
        // GET takes the numeric id, DELETE the category name
        .route(
            "/categories/{category}",
            get(catalog::get_category).delete(catalog::delete_category),
        )
        .route("/add_to_cart", post(cart::add_to_cart))
        .route("/del_from_cart", delete(cart::del_from_cart))
        .route("/cart", get(cart::get_cart))
        .route("/create_order", post(orders::create_order))
        .route("/avatar/{user_id}", get(media::get_avatar))
        .route("/images/{file_id}", get(media::get_image))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the API until the listener fails
pub async fn run_api_server(port: u16, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    log::info!("Starting REST API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_api(listener, state).await
}

/// Serves the API on an already bound listener
pub async fn serve_api(listener: tokio::net::TcpListener, state: ApiState) -> anyhow::Result<()> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "API launched successfully!" }))
}

async fn health_check() -> &'static str {
    "ok"
}
