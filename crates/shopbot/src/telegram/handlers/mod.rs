//! Telegram update handlers
//!
//! - `schema`: dispatcher tree
//! - `commands`: /start
//! - `wizard`: callback and message glue around the wizard state machine

mod commands;
pub mod schema;
pub mod types;
pub mod wizard;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
