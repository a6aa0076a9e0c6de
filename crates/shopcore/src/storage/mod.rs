//! Database access: pool, migrations and the catalog/cart/order tables

pub mod cart;
pub mod catalog;
pub mod db;
pub mod migrations;
pub mod orders;

// Re-exports for convenience
pub use db::{create_memory_pool, create_pool, get_connection, DbConnection, DbPool};
