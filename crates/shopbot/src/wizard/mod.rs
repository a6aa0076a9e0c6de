//! Catalog wizard
//!
//! - `state`: pure transitions
//! - `session`: per-user session store with a TTL
//! - `finish`: executes the terminal effects against the catalog

use async_trait::async_trait;

use shopcore::storage::catalog::{NewProduct, Product};
use shopcore::{AppError, AppResult};

use crate::catalog_client::CatalogClient;

pub mod session;
pub mod state;

pub use session::SessionStore;
pub use state::{
    advance, CompletedDraft, Prompt, Session, Transition, WizardAction, WizardCallback, WizardEffect, WizardInput,
    WizardStep,
};

/// Turns an uploaded photo's file id into the image reference stored with
/// the product.
#[async_trait]
pub trait PhotoResolver: Send + Sync {
    async fn resolve(&self, file_id: &str) -> AppResult<String>;
}

/// Result of a terminal wizard effect
#[derive(Debug)]
pub enum WizardOutcome {
    Created(Product),
    Deleted(i64),
    Cancelled,
    Failed(AppError),
}

impl WizardOutcome {
    /// Text of the callback answer shown to the operator
    pub fn answer_text(&self) -> String {
        match self {
            WizardOutcome::Created(_) => "✅ Item added!".to_string(),
            WizardOutcome::Deleted(_) => "🗑️ Item deleted!".to_string(),
            WizardOutcome::Cancelled => "❌ Cancelled!".to_string(),
            WizardOutcome::Failed(e) if e.is_client_error() => format!("⚠️ {}", e),
            WizardOutcome::Failed(_) => "⚠️ Something went wrong, please try again later".to_string(),
        }
    }
}

/// Executes a terminal effect. Returns `None` for effects that keep the
/// session open.
///
/// Failures are reported through [`WizardOutcome::Failed`]; nothing is
/// retried.
pub async fn finish(
    effect: &WizardEffect,
    catalog: &dyn CatalogClient,
    photos: &dyn PhotoResolver,
) -> Option<WizardOutcome> {
    match effect {
        WizardEffect::Create(draft) => Some(create_product(draft, catalog, photos).await),
        WizardEffect::Delete(product_id) => Some(match catalog.delete_product(*product_id).await {
            Ok(()) => {
                log::info!("Wizard deleted product {}", product_id);
                WizardOutcome::Deleted(*product_id)
            }
            Err(e) => {
                log::warn!("Wizard failed to delete product {}: {}", product_id, e);
                WizardOutcome::Failed(e)
            }
        }),
        WizardEffect::Cancelled => Some(WizardOutcome::Cancelled),
        WizardEffect::Render(_) | WizardEffect::Ignored => None,
    }
}

async fn create_product(draft: &CompletedDraft, catalog: &dyn CatalogClient, photos: &dyn PhotoResolver) -> WizardOutcome {
    let image_url = match photos.resolve(&draft.photo_file_id).await {
        Ok(url) => url,
        Err(e) => {
            log::error!("Failed to resolve photo {}: {}", draft.photo_file_id, e);
            return WizardOutcome::Failed(e);
        }
    };

    let product = NewProduct {
        name: draft.title.clone(),
        price: draft.price,
        gender: draft.gender,
        category: draft.category.clone(),
        image_url,
    };

    match catalog.create_product(&product).await {
        Ok(created) => {
            log::info!("Wizard created product {} '{}'", created.id, created.name);
            WizardOutcome::Created(created)
        }
        Err(e) => {
            if e.is_client_error() {
                log::warn!("Wizard rejected product '{}': {}", product.name, e);
            } else {
                log::error!("Wizard failed to create product '{}': {}", product.name, e);
            }
            WizardOutcome::Failed(e)
        }
    }
}
