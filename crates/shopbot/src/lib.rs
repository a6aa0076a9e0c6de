//! Shopbot - Telegram storefront bot
//!
//! Operators grow and prune the catalog through a chat wizard; shoppers
//! browse through the Web App, which talks to the REST API from `shopcore`.
//!
//! # Module Structure
//!
//! - `cli`: Command-line interface
//! - `catalog_client`: Catalog access for the wizard (in-process or HTTP)
//! - `wizard`: Add/delete item state machine and session store
//! - `telegram`: Bot setup, keyboards, dispatcher schema and Telegram-backed services

pub mod catalog_client;
pub mod cli;
pub mod telegram;
pub mod wizard;

pub use catalog_client::{CatalogClient, HttpCatalog, LocalCatalog};
