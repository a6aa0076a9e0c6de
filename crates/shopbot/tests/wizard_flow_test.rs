//! End-to-end wizard runs against an in-memory store
//!
//! Drives the pure state machine and then executes the terminal effect the
//! same way the Telegram handlers do, without a bot.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shopbot::catalog_client::{CatalogClient, LocalCatalog};
use shopbot::wizard::{
    advance, finish, PhotoResolver, Session, SessionStore, WizardAction, WizardCallback, WizardEffect, WizardInput,
    WizardOutcome,
};
use shopcore::core::types::Gender;
use shopcore::storage::catalog::NewProduct;
use shopcore::storage::create_memory_pool;
use shopcore::{AppError, AppResult};

/// Stores photos under a fake public URL and counts lookups
#[derive(Default)]
struct FakePhotos {
    calls: AtomicUsize,
}

#[async_trait]
impl PhotoResolver for FakePhotos {
    async fn resolve(&self, file_id: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://shop.test/images/{}", file_id))
    }
}

struct BrokenPhotos;

#[async_trait]
impl PhotoResolver for BrokenPhotos {
    async fn resolve(&self, _file_id: &str) -> AppResult<String> {
        Err(AppError::Upstream("getFile failed".to_string()))
    }
}

fn catalog() -> LocalCatalog {
    LocalCatalog::new(Arc::new(create_memory_pool().unwrap()))
}

fn callback(callback: WizardCallback) -> WizardInput {
    WizardInput::Callback(callback)
}

fn text(value: &str) -> WizardInput {
    WizardInput::Text(value.to_string())
}

/// Feeds inputs one by one, the way the handlers do, and returns the last effect.
fn run(action: WizardAction, inputs: Vec<WizardInput>) -> WizardEffect {
    let mut session = Some(Session::start(action, 42));
    let mut effect = WizardEffect::Ignored;
    for input in inputs {
        let current = session.take().unwrap();
        let transition = advance(current, input);
        session = transition.session;
        effect = transition.effect;
    }
    effect
}

fn add_cap_inputs(confirm: WizardCallback) -> Vec<WizardInput> {
    vec![
        callback(WizardCallback::Gender(Gender::Unisex)),
        callback(WizardCallback::Category("Hats".to_string())),
        text("Cap"),
        WizardInput::Photo("AgACphoto".to_string()),
        text("15"),
        callback(confirm),
    ]
}

#[tokio::test]
async fn test_allow_creates_exactly_one_product() {
    let catalog = catalog();
    let photos = FakePhotos::default();

    let effect = run(WizardAction::Add, add_cap_inputs(WizardCallback::Allow));
    let outcome = finish(&effect, &catalog, &photos).await.unwrap();

    let WizardOutcome::Created(product) = outcome else {
        panic!("expected a created product, got {:?}", outcome);
    };
    assert_eq!(product.name, "Cap");
    assert_eq!(product.price, 15);
    assert_eq!(product.gender, Gender::Unisex);
    assert_eq!(product.category, "Hats");
    assert_eq!(product.image_url, "https://shop.test/images/AgACphoto");
    assert_eq!(photos.calls.load(Ordering::SeqCst), 1);

    let listed = catalog.products(Gender::Unisex).await.unwrap();
    assert_eq!(listed, vec![product]);
}

#[tokio::test]
async fn test_deny_creates_nothing() {
    let catalog = catalog();
    let photos = FakePhotos::default();

    let effect = run(WizardAction::Add, add_cap_inputs(WizardCallback::Deny));
    let outcome = finish(&effect, &catalog, &photos).await.unwrap();

    assert!(matches!(outcome, WizardOutcome::Cancelled));
    assert_eq!(photos.calls.load(Ordering::SeqCst), 0);
    assert!(catalog.products(Gender::Unisex).await.unwrap().is_empty());
    assert!(catalog.categories(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_price_keeps_the_wizard_open() {
    let catalog = catalog();
    let photos = FakePhotos::default();

    let mut inputs = add_cap_inputs(WizardCallback::Allow);
    inputs.insert(4, text("free"));
    inputs.insert(5, text("-3"));

    let effect = run(WizardAction::Add, inputs);
    let outcome = finish(&effect, &catalog, &photos).await.unwrap();
    assert!(matches!(outcome, WizardOutcome::Created(ref p) if p.price == 15));
}

#[tokio::test]
async fn test_delete_path_removes_the_product() {
    let catalog = catalog();
    let photos = FakePhotos::default();
    let created = catalog
        .create_product(&NewProduct {
            name: "Dress".to_string(),
            price: 90,
            gender: Gender::Female,
            category: "Dresses".to_string(),
            image_url: String::new(),
        })
        .await
        .unwrap();

    let effect = run(
        WizardAction::Delete,
        vec![
            callback(WizardCallback::Gender(Gender::Female)),
            callback(WizardCallback::Product(created.id)),
        ],
    );
    assert_eq!(effect, WizardEffect::Delete(created.id));

    let outcome = finish(&effect, &catalog, &photos).await.unwrap();
    assert!(matches!(outcome, WizardOutcome::Deleted(id) if id == created.id));
    assert!(catalog.products(Gender::Female).await.unwrap().is_empty());

    // The same button pressed again on a stale keyboard
    let outcome = finish(&effect, &catalog, &photos).await.unwrap();
    assert_eq!(outcome.answer_text(), "⚠️ Product not found");
}

#[tokio::test]
async fn test_duplicate_product_is_reported_to_the_operator() {
    let catalog = catalog();
    let photos = FakePhotos::default();

    let effect = run(WizardAction::Add, add_cap_inputs(WizardCallback::Allow));
    finish(&effect, &catalog, &photos).await.unwrap();

    let outcome = finish(&effect, &catalog, &photos).await.unwrap();
    let WizardOutcome::Failed(ref err) = outcome else {
        panic!("expected a failure, got {:?}", outcome);
    };
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(outcome.answer_text(), "⚠️ Product already exists");
    assert_eq!(catalog.products(Gender::Unisex).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_photo_failure_creates_nothing() {
    let catalog = catalog();

    let effect = run(WizardAction::Add, add_cap_inputs(WizardCallback::Allow));
    let outcome = finish(&effect, &catalog, &BrokenPhotos).await.unwrap();

    assert_eq!(outcome.answer_text(), "⚠️ Something went wrong, please try again later");
    assert!(catalog.products(Gender::Unisex).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sessions_are_independent_per_user() {
    let store = SessionStore::new(std::time::Duration::from_secs(60));
    store.set(1, Session::start(WizardAction::Add, 10)).await;
    store.set(2, Session::start(WizardAction::Delete, 20)).await;

    let first = store.get(1).await.unwrap();
    let transition = advance(first, callback(WizardCallback::Gender(Gender::Male)));
    store.store(1, transition.session).await;

    let second = store.get(2).await.unwrap();
    assert_eq!(second.action, WizardAction::Delete);
    assert_eq!(second.draft.gender, None);

    let transition = advance(second, callback(WizardCallback::Cancel));
    assert_eq!(transition.effect, WizardEffect::Cancelled);
    store.store(2, transition.session).await;

    assert!(store.get(2).await.is_none());
    assert_eq!(store.get(1).await.unwrap().draft.gender, Some(Gender::Male));
}
