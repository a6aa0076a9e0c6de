//! Shopcore - catalog, cart and order storage for the storefront bot
//!
//! This library holds everything that does not need a live Telegram
//! connection: configuration, error types, the SQLite store and the REST API.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and shared types
//! - `storage`: Connection pool, migrations, catalog/cart/order tables
//! - `api`: axum router exposing the stores over HTTP
//! - `notifications`: operator notification contract for new orders

pub mod api;
pub mod core;
pub mod notifications;
pub mod storage;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
