//! Checkout orders
//!
//! An order is written once and never updated; its items are stored as a
//! JSON snapshot so later catalog edits do not change past orders.

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::cart::CartProduct;
use crate::core::error::AppResult;

/// Checkout form submitted by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIn {
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
    pub items: Vec<CartProduct>,
    pub total: i64,
}

/// Stored order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
    pub items: Vec<CartProduct>,
    pub total: i64,
    pub created_at: String,
}

/// Persists an order and returns its id.
pub fn create_order(conn: &mut Connection, order: &OrderIn) -> AppResult<i64> {
    let items = serde_json::to_string(&order.items)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO orders (user_id, name, phone, address, postcode, city, country, items, total)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            order.user_id,
            order.name,
            order.phone,
            order.address,
            order.postcode,
            order.city,
            order.country,
            items,
            order.total,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    log::info!(
        "Order {} created for user {} ({} item(s), total {})",
        id,
        order.user_id,
        order.items.len(),
        order.total
    );
    Ok(id)
}

pub fn get_order(conn: &Connection, order_id: i64) -> AppResult<Option<Order>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, name, phone, address, postcode, city, country, items, total, created_at
             FROM orders WHERE id = ?1",
            rusqlite::params![order_id],
            |row| {
                Ok((
                    Order {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        phone: row.get(3)?,
                        address: row.get(4)?,
                        postcode: row.get(5)?,
                        city: row.get(6)?,
                        country: row.get(7)?,
                        items: Vec::new(),
                        total: row.get(9)?,
                        created_at: row.get(10)?,
                    },
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((mut order, items)) => {
            order.items = serde_json::from_str(&items)?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}
