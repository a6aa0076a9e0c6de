use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use super::ApiState;
use crate::core::error::AppResult;
use crate::notifications::dispatch_order_notification;
use crate::storage::db::get_connection;
use crate::storage::orders::{self, OrderIn};

/// POST /create_order
///
/// The order is committed before the operator is notified; the response does
/// not wait for the notification.
pub async fn create_order(
    State(state): State<Arc<ApiState>>,
    Json(order): Json<OrderIn>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let order_id = {
        let mut conn = get_connection(&state.db_pool)?;
        orders::create_order(&mut conn, &order)?
    };

    dispatch_order_notification(Arc::clone(&state.notifier), order_id, order);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Order created",
            "order_id": order_id,
        })),
    ))
}
