use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::ApiState;
use crate::core::error::{AppError, AppResult};
use crate::core::types::Gender;
use crate::storage::catalog::{self, CategorySummary, NewProduct, Product};
use crate::storage::db::get_connection;

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub gender: Option<Gender>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// GET /products
pub async fn list_products(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    let conn = get_connection(&state.db_pool)?;
    let products = catalog::list_products(&conn, filter.gender, filter.category.as_deref())?;
    Ok(Json(products))
}

/// GET /products/{id}
pub async fn get_product(State(state): State<Arc<ApiState>>, Path(id): Path<i64>) -> AppResult<Json<Product>> {
    let conn = get_connection(&state.db_pool)?;
    catalog::get_product(&conn, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// POST /products
pub async fn create_product(
    State(state): State<Arc<ApiState>>,
    Json(product): Json<NewProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let mut conn = get_connection(&state.db_pool)?;
    let created = catalog::create_product(&mut conn, &product)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = get_connection(&state.db_pool)?;
    catalog::delete_product(&mut conn, id)?;
    Ok(Json(serde_json::json!({ "detail": "Product successfully deleted" })))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<Json<Vec<CategorySummary>>> {
    let conn = get_connection(&state.db_pool)?;
    Ok(Json(catalog::list_categories(&conn, filter.gender)?))
}

/// POST /categories
pub async fn create_category(
    State(state): State<Arc<ApiState>>,
    Json(category): Json<NewCategory>,
) -> AppResult<(StatusCode, Json<CategorySummary>)> {
    let mut conn = get_connection(&state.db_pool)?;
    let created = catalog::create_category(&mut conn, &category.name)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<CategorySummary>> {
    let conn = get_connection(&state.db_pool)?;
    catalog::get_category(&conn, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

/// DELETE /categories/{name}
pub async fn delete_category(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = get_connection(&state.db_pool)?;
    let removed = catalog::delete_category_by_name(&mut conn, &name)?;
    Ok(Json(serde_json::json!({
        "detail": format!("Category '{}' and all its products deleted", name),
        "products_deleted": removed,
    })))
}
