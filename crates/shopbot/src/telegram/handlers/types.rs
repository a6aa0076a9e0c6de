//! Handler types and dependencies

use std::sync::Arc;

use crate::catalog_client::CatalogClient;
use crate::wizard::{PhotoResolver, SessionStore};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub catalog: Arc<dyn CatalogClient>,
    pub sessions: Arc<SessionStore>,
    pub photos: Arc<dyn PhotoResolver>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(catalog: Arc<dyn CatalogClient>, sessions: Arc<SessionStore>, photos: Arc<dyn PhotoResolver>) -> Self {
        Self {
            catalog,
            sessions,
            photos,
        }
    }
}
