use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::ApiState;
use crate::core::error::AppResult;
use crate::storage::cart::{self, CartProduct};
use crate::storage::db::get_connection;

fn default_quantity() -> i64 {
    1
}

/// Query string of the cart mutation endpoints
#[derive(Debug, Deserialize)]
pub struct CartLineParams {
    pub user_id: i64,
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CartParams {
    pub user_id: i64,
}

/// POST /add_to_cart?user_id=&product_id=&quantity=
pub async fn add_to_cart(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CartLineParams>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = get_connection(&state.db_pool)?;
    let quantity = cart::add_to_cart(&mut conn, params.user_id, params.product_id, params.quantity)?;
    Ok(Json(serde_json::json!({
        "message": "Item added to cart",
        "quantity": quantity,
    })))
}

/// DELETE /del_from_cart?user_id=&product_id=&quantity=
pub async fn del_from_cart(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CartLineParams>,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = get_connection(&state.db_pool)?;
    let remaining = cart::remove_from_cart(&mut conn, params.user_id, params.product_id, params.quantity)?;
    Ok(Json(serde_json::json!({
        "message": "Item removed from cart",
        "quantity": remaining,
    })))
}

/// GET /cart?user_id=
pub async fn get_cart(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CartParams>,
) -> AppResult<Json<Vec<CartProduct>>> {
    let conn = get_connection(&state.db_pool)?;
    Ok(Json(cart::get_cart(&conn, params.user_id)?))
}
