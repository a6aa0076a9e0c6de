//! Catalog access used by the wizard
//!
//! The bot either shares the process (and the SQLite pool) with the API, or
//! runs separately and reaches the catalog over HTTP when `API_BASE_URL` is
//! set. Both sides speak the same types and the same error variants.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use shopcore::core::types::Gender;
use shopcore::storage::catalog::{self, CategorySummary, NewProduct, Product};
use shopcore::storage::DbPool;
use shopcore::{config, get_connection, AppError, AppResult};

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn categories(&self, gender: Option<Gender>) -> AppResult<Vec<CategorySummary>>;
    async fn products(&self, gender: Gender) -> AppResult<Vec<Product>>;
    async fn create_product(&self, product: &NewProduct) -> AppResult<Product>;
    async fn delete_product(&self, product_id: i64) -> AppResult<()>;
}

/// Talks to the store directly
pub struct LocalCatalog {
    db_pool: Arc<DbPool>,
}

impl LocalCatalog {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CatalogClient for LocalCatalog {
    async fn categories(&self, gender: Option<Gender>) -> AppResult<Vec<CategorySummary>> {
        let conn = get_connection(&self.db_pool)?;
        catalog::list_categories(&conn, gender)
    }

    async fn products(&self, gender: Gender) -> AppResult<Vec<Product>> {
        let conn = get_connection(&self.db_pool)?;
        catalog::list_products(&conn, Some(gender), None)
    }

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product> {
        let mut conn = get_connection(&self.db_pool)?;
        catalog::create_product(&mut conn, product)
    }

    async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let mut conn = get_connection(&self.db_pool)?;
        catalog::delete_product(&mut conn, product_id)
    }
}

/// Talks to a remote catalog API
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Maps `{"error": ...}` replies onto the matching error variant.
    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Catalog API returned {}", status));

        Err(match status {
            StatusCode::BAD_REQUEST => AppError::Validation(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::Upstream(message),
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    async fn categories(&self, gender: Option<Gender>) -> AppResult<Vec<CategorySummary>> {
        let mut request = self.client.get(self.url("/categories"));
        if let Some(gender) = gender {
            request = request.query(&[("gender", gender.as_ref())]);
        }
        Self::parse(request.send().await?).await
    }

    async fn products(&self, gender: Gender) -> AppResult<Vec<Product>> {
        let request = self
            .client
            .get(self.url("/products"))
            .query(&[("gender", gender.as_ref())]);
        Self::parse(request.send().await?).await
    }

    async fn create_product(&self, product: &NewProduct) -> AppResult<Product> {
        let response = self.client.post(self.url("/products")).json(product).send().await?;
        Self::parse(response).await
    }

    async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/products/{}", product_id)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Picks the HTTP client when `API_BASE_URL` is set, the local store otherwise.
pub fn from_config(db_pool: Arc<DbPool>) -> AppResult<Arc<dyn CatalogClient>> {
    match config::api::BASE_URL.as_deref() {
        Some(base_url) => Ok(Arc::new(HttpCatalog::new(base_url)?)),
        None => Ok(Arc::new(LocalCatalog::new(db_pool))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcore::api::{serve_api, ApiState, UnavailableMedia};
    use shopcore::notifications::NoopNotifier;
    use shopcore::storage::create_memory_pool;

    fn hoodie(gender: Gender) -> NewProduct {
        NewProduct {
            name: "Hoodie".to_string(),
            price: 70,
            gender,
            category: "Tops".to_string(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_local_catalog_roundtrip() {
        let catalog = LocalCatalog::new(Arc::new(create_memory_pool().unwrap()));

        let created = catalog.create_product(&hoodie(Gender::Male)).await.unwrap();
        assert_eq!(catalog.products(Gender::Male).await.unwrap(), vec![created.clone()]);
        assert!(catalog.products(Gender::Female).await.unwrap().is_empty());
        assert_eq!(catalog.categories(None).await.unwrap()[0].name, "Tops");

        catalog.delete_product(created.id).await.unwrap();
        assert!(matches!(
            catalog.delete_product(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_catalog_reports_duplicates_as_validation() {
        let catalog = LocalCatalog::new(Arc::new(create_memory_pool().unwrap()));
        catalog.create_product(&hoodie(Gender::Male)).await.unwrap();
        let err = catalog.create_product(&hoodie(Gender::Male)).await.unwrap_err();
        assert_eq!(err.to_string(), "Product already exists");
    }

    /// Serves the real router on an ephemeral port, returns its base URL
    async fn serve(db_pool: Arc<DbPool>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ApiState::new(db_pool, Arc::new(NoopNotifier), Arc::new(UnavailableMedia));
        tokio::spawn(serve_api(listener, state));
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_catalog_roundtrip() {
        let base_url = serve(Arc::new(create_memory_pool().unwrap())).await;
        let catalog = HttpCatalog::new(base_url).unwrap();

        let created = catalog.create_product(&hoodie(Gender::Male)).await.unwrap();
        assert_eq!(created.name, "Hoodie");
        assert_eq!(created.category, "Tops");
        assert_eq!(catalog.products(Gender::Male).await.unwrap(), vec![created.clone()]);

        let categories = catalog.categories(Some(Gender::Male)).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].products_count, 1);
        assert!(catalog.categories(Some(Gender::Female)).await.unwrap().is_empty());

        let err = catalog.create_product(&hoodie(Gender::Male)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Product already exists");

        catalog.delete_product(created.id).await.unwrap();
        let err = catalog.delete_product(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Product not found");
    }

    #[tokio::test]
    async fn test_http_catalog_server_failure_is_upstream() {
        let db_pool = Arc::new(create_memory_pool().unwrap());
        get_connection(&db_pool)
            .unwrap()
            .execute_batch("DROP TABLE cart; DROP TABLE products;")
            .unwrap();
        let catalog = HttpCatalog::new(serve(db_pool).await).unwrap();

        assert!(matches!(
            catalog.products(Gender::Male).await,
            Err(AppError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_http_catalog_unknown_route_without_error_body() {
        let base_url = serve(Arc::new(create_memory_pool().unwrap())).await;
        let catalog = HttpCatalog::new(format!("{}/missing", base_url)).unwrap();

        let err = catalog.delete_product(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Catalog API returned 404 Not Found");
    }

    #[test]
    fn test_http_catalog_trims_base_url() {
        let catalog = HttpCatalog::new("http://localhost:8000/").unwrap();
        assert_eq!(catalog.url("/products"), "http://localhost:8000/products");
    }
}
