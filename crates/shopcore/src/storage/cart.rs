//! Per-user shopping cart
//!
//! One row per (user, product) pair; repeated adds bump the quantity.

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::{AppError, AppResult};
use crate::core::types::Gender;

/// Cart line joined with its product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product id
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub gender: Gender,
    pub category: String,
    pub image_url: String,
    pub quantity: i64,
}

fn check_quantity(quantity: i64) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    Ok(())
}

/// Adds `quantity` units of a product to the user's cart.
///
/// Returns the resulting quantity of that line.
pub fn add_to_cart(conn: &mut Connection, user_id: i64, product_id: i64, quantity: i64) -> AppResult<i64> {
    check_quantity(quantity)?;

    let tx = conn.transaction()?;

    let product_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)",
        rusqlite::params![product_id],
        |row| row.get(0),
    )?;
    if !product_exists {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let existing: Option<(i64, i64)> = tx
        .query_row(
            "SELECT id, quantity FROM cart WHERE user_id = ?1 AND product_id = ?2",
            rusqlite::params![user_id, product_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let new_quantity = match existing {
        Some((line_id, current)) => {
            let total = current
                .checked_add(quantity)
                .ok_or_else(|| AppError::Validation("Quantity is too large".to_string()))?;
            tx.execute(
                "UPDATE cart SET quantity = ?1 WHERE id = ?2",
                rusqlite::params![total, line_id],
            )?;
            total
        }
        None => {
            tx.execute(
                "INSERT INTO cart (user_id, product_id, quantity) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, product_id, quantity],
            )?;
            quantity
        }
    };
    tx.commit()?;

    log::debug!("Cart {}: product {} -> quantity {}", user_id, product_id, new_quantity);
    Ok(new_quantity)
}

/// Removes `quantity` units of a product from the user's cart.
///
/// The line is dropped when nothing would be left. Returns the remaining
/// quantity (0 when the line was removed).
pub fn remove_from_cart(conn: &mut Connection, user_id: i64, product_id: i64, quantity: i64) -> AppResult<i64> {
    check_quantity(quantity)?;

    let tx = conn.transaction()?;

    let existing: Option<(i64, i64)> = tx
        .query_row(
            "SELECT id, quantity FROM cart WHERE user_id = ?1 AND product_id = ?2",
            rusqlite::params![user_id, product_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((line_id, current)) = existing else {
        return Err(AppError::NotFound("Item not found in cart".to_string()));
    };

    let remaining = if current > quantity {
        let left = current - quantity;
        tx.execute(
            "UPDATE cart SET quantity = ?1 WHERE id = ?2",
            rusqlite::params![left, line_id],
        )?;
        left
    } else {
        tx.execute("DELETE FROM cart WHERE id = ?1", rusqlite::params![line_id])?;
        0
    };
    tx.commit()?;

    log::debug!("Cart {}: product {} -> quantity {}", user_id, product_id, remaining);
    Ok(remaining)
}

pub fn get_cart(conn: &Connection, user_id: i64) -> AppResult<Vec<CartProduct>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.price, p.gender, c.name, p.image_url, ci.quantity
         FROM cart ci
         JOIN products p ON p.id = ci.product_id
         JOIN categories c ON c.id = p.category_id
         WHERE ci.user_id = ?1
         ORDER BY ci.id",
    )?;

    let rows = stmt.query_map(rusqlite::params![user_id], |row| {
        let gender: String = row.get(3)?;
        let gender = Gender::from_str(&gender)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;
        Ok(CartProduct {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            gender,
            category: row.get(4)?,
            image_url: row.get(5)?,
            quantity: row.get(6)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::catalog::{create_product, delete_product, NewProduct};
    use crate::storage::db::{create_memory_pool, get_connection, DbPool};

    fn seed_product(pool: &DbPool) -> i64 {
        let mut conn = get_connection(pool).unwrap();
        create_product(
            &mut conn,
            &NewProduct {
                name: "Hoodie".to_string(),
                price: 80,
                gender: Gender::Unisex,
                category: "Tops".to_string(),
                image_url: String::new(),
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_repeat_add_merges_quantity() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        assert_eq!(add_to_cart(&mut conn, 7, product_id, 2).unwrap(), 2);
        assert_eq!(add_to_cart(&mut conn, 7, product_id, 3).unwrap(), 5);

        let cart = get_cart(&conn, 7).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 5);
        assert_eq!(cart[0].category, "Tops");
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        assert!(matches!(add_to_cart(&mut conn, 7, product_id, 0), Err(AppError::Validation(_))));
        assert!(matches!(add_to_cart(&mut conn, 7, 9999, 1), Err(AppError::NotFound(_))));
        assert!(get_cart(&conn, 7).unwrap().is_empty());
    }

    #[test]
    fn test_remove_decrements_then_deletes() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        add_to_cart(&mut conn, 7, product_id, 5).unwrap();
        assert_eq!(remove_from_cart(&mut conn, 7, product_id, 2).unwrap(), 3);
        assert_eq!(remove_from_cart(&mut conn, 7, product_id, 3).unwrap(), 0);
        assert!(get_cart(&conn, 7).unwrap().is_empty());

        assert!(matches!(
            remove_from_cart(&mut conn, 7, product_id, 1),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_rejects_non_positive_quantity() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        add_to_cart(&mut conn, 7, product_id, 5).unwrap();
        for quantity in [0, -5, i64::MIN] {
            assert!(matches!(
                remove_from_cart(&mut conn, 7, product_id, quantity),
                Err(AppError::Validation(_))
            ));
        }
        assert_eq!(get_cart(&conn, 7).unwrap()[0].quantity, 5);

        // Removing more than is left drops the line
        assert_eq!(remove_from_cart(&mut conn, 7, product_id, i64::MAX).unwrap(), 0);
        assert!(get_cart(&conn, 7).unwrap().is_empty());
    }

    #[test]
    fn test_add_overflow_is_rejected() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        assert_eq!(add_to_cart(&mut conn, 7, product_id, i64::MAX).unwrap(), i64::MAX);
        let err = add_to_cart(&mut conn, 7, product_id, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Quantity is too large");
        assert_eq!(get_cart(&conn, 7).unwrap()[0].quantity, i64::MAX);
    }

    #[test]
    fn test_carts_are_per_user() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        add_to_cart(&mut conn, 1, product_id, 1).unwrap();
        add_to_cart(&mut conn, 2, product_id, 4).unwrap();

        assert_eq!(get_cart(&conn, 1).unwrap()[0].quantity, 1);
        assert_eq!(get_cart(&conn, 2).unwrap()[0].quantity, 4);
    }

    #[test]
    fn test_deleting_product_clears_cart_lines() {
        let pool = create_memory_pool().unwrap();
        let product_id = seed_product(&pool);
        let mut conn = get_connection(&pool).unwrap();

        add_to_cart(&mut conn, 7, product_id, 2).unwrap();
        delete_product(&mut conn, product_id).unwrap();
        assert!(get_cart(&conn, 7).unwrap().is_empty());
    }
}
