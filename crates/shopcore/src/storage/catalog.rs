//! Catalog storage: products and the categories they belong to
//!
//! Products reference categories by id; the API and the wizard always speak
//! in category names, so every read joins the two tables.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::{AppError, AppResult};
use crate::core::types::Gender;

/// A product as listed by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Whole euros
    pub price: i64,
    pub gender: Gender,
    /// Category name
    pub category: String,
    /// Public URL or Telegram file id of the product photo
    pub image_url: String,
}

/// Payload for creating a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub gender: Gender,
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

/// Category with the number of products currently filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub products_count: i64,
}

const PRODUCT_COLUMNS: &str = "SELECT p.id, p.name, p.price, p.gender, c.name, p.image_url
     FROM products p JOIN categories c ON c.id = p.category_id";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let gender: String = row.get(3)?;
    let gender = Gender::from_str(&gender).map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        gender,
        category: row.get(4)?,
        image_url: row.get(5)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<CategorySummary> {
    Ok(CategorySummary {
        id: row.get(0)?,
        name: row.get(1)?,
        products_count: row.get(2)?,
    })
}

/// True when the error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn validate_new_product(product: &NewProduct) -> AppResult<()> {
    if product.name.trim().is_empty() {
        return Err(AppError::Validation("Product name must not be empty".to_string()));
    }
    if product.category.trim().is_empty() {
        return Err(AppError::Validation("Category must not be empty".to_string()));
    }
    if product.price <= 0 {
        return Err(AppError::Validation("Price must be a positive number".to_string()));
    }
    Ok(())
}

/// Lists products, optionally narrowed by gender and/or category name.
pub fn list_products(conn: &Connection, gender: Option<Gender>, category: Option<&str>) -> AppResult<Vec<Product>> {
    let sql = format!(
        "{} WHERE (?1 IS NULL OR p.gender = ?1) AND (?2 IS NULL OR c.name = ?2) ORDER BY p.id",
        PRODUCT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let gender = gender.map(|g| g.to_string());
    let rows = stmt.query_map(rusqlite::params![gender, category], product_from_row)?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Returns `Ok(None)` if the product does not exist.
pub fn get_product(conn: &Connection, product_id: i64) -> AppResult<Option<Product>> {
    let sql = format!("{} WHERE p.id = ?1", PRODUCT_COLUMNS);
    Ok(conn
        .query_row(&sql, rusqlite::params![product_id], product_from_row)
        .optional()?)
}

/// Creates a product, creating its category on the fly if needed.
///
/// The duplicate check, the category insert and the product insert share one
/// transaction. An existing product with the same name, category and gender
/// is rejected with [`AppError::Validation`].
pub fn create_product(conn: &mut Connection, product: &NewProduct) -> AppResult<Product> {
    validate_new_product(product)?;
    let name = product.name.trim();
    let category = product.category.trim();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let category_id: i64 = match tx
        .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            rusqlite::params![category],
            |row| row.get(0),
        )
        .optional()?
    {
        Some(id) => id,
        None => {
            tx.execute("INSERT INTO categories (name) VALUES (?1)", rusqlite::params![category])?;
            log::info!("Created category '{}'", category);
            tx.last_insert_rowid()
        }
    };

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM products WHERE name = ?1 AND category_id = ?2 AND gender = ?3)",
        rusqlite::params![name, category_id, product.gender.as_ref()],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::Validation("Product already exists".to_string()));
    }

    tx.execute(
        "INSERT INTO products (name, price, gender, image_url, category_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![name, product.price, product.gender.as_ref(), product.image_url, category_id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation("Product already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    log::info!("Created product {} '{}' in '{}' ({})", id, name, category, product.gender);

    Ok(Product {
        id,
        name: name.to_string(),
        price: product.price,
        gender: product.gender,
        category: category.to_string(),
        image_url: product.image_url.clone(),
    })
}

/// Deletes a product by id. Cart lines pointing at it go with it.
pub fn delete_product(conn: &mut Connection, product_id: i64) -> AppResult<()> {
    let tx = conn.transaction()?;
    let rows_affected = tx.execute("DELETE FROM products WHERE id = ?1", rusqlite::params![product_id])?;
    if rows_affected == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    tx.commit()?;

    log::info!("Deleted product {}", product_id);
    Ok(())
}

/// Lists categories with their product counts.
///
/// With a gender filter only categories holding products of that gender are
/// returned, and `products_count` counts only those products.
pub fn list_categories(conn: &Connection, gender: Option<Gender>) -> AppResult<Vec<CategorySummary>> {
    let categories = match gender {
        Some(gender) => {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, COUNT(p.id)
                 FROM categories c JOIN products p ON p.category_id = c.id
                 WHERE p.gender = ?1
                 GROUP BY c.id, c.name
                 ORDER BY c.name",
            )?;
            let rows = stmt.query_map(rusqlite::params![gender.as_ref()], summary_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, COUNT(p.id)
                 FROM categories c LEFT JOIN products p ON p.category_id = c.id
                 GROUP BY c.id, c.name
                 ORDER BY c.name",
            )?;
            let rows = stmt.query_map([], summary_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(categories)
}

/// Creates an empty category.
pub fn create_category(conn: &mut Connection, name: &str) -> AppResult<CategorySummary> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name must not be empty".to_string()));
    }

    let tx = conn.transaction()?;
    tx.execute("INSERT INTO categories (name) VALUES (?1)", rusqlite::params![name])
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation("Category with this name already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    log::info!("Created category {} '{}'", id, name);
    Ok(CategorySummary {
        id,
        name: name.to_string(),
        products_count: 0,
    })
}

pub fn get_category(conn: &Connection, category_id: i64) -> AppResult<Option<CategorySummary>> {
    Ok(conn
        .query_row(
            "SELECT c.id, c.name, (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id)
             FROM categories c WHERE c.id = ?1",
            rusqlite::params![category_id],
            summary_from_row,
        )
        .optional()?)
}

/// Deletes a category and, through the cascade, every product in it.
///
/// Returns the number of products removed.
pub fn delete_category_by_name(conn: &mut Connection, name: &str) -> AppResult<i64> {
    let tx = conn.transaction()?;

    let category_id: Option<i64> = tx
        .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            rusqlite::params![name],
            |row| row.get(0),
        )
        .optional()?;
    let Some(category_id) = category_id else {
        return Err(AppError::NotFound("Category not found".to_string()));
    };

    let products: i64 = tx.query_row(
        "SELECT COUNT(*) FROM products WHERE category_id = ?1",
        rusqlite::params![category_id],
        |row| row.get(0),
    )?;
    tx.execute("DELETE FROM categories WHERE id = ?1", rusqlite::params![category_id])?;
    tx.commit()?;

    log::info!("Deleted category '{}' with {} product(s)", name, products);
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::{create_memory_pool, get_connection};
    use pretty_assertions::assert_eq;

    fn new_product(name: &str, category: &str, gender: Gender) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: 120,
            gender,
            category: category.to_string(),
            image_url: "file-id".to_string(),
        }
    }

    #[test]
    fn test_create_product_autocreates_category() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        let created = create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        assert_eq!(created.category, "Tops");

        let categories = list_categories(&conn, None).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Tops");
        assert_eq!(categories[0].products_count, 1);

        let fetched = get_product(&conn, created.id).unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[test]
    fn test_duplicate_product_is_rejected_without_side_effects() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        let err = create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Product already exists"));
        assert_eq!(list_products(&conn, None, None).unwrap().len(), 1);

        // Same name under another gender is a different product
        create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Female)).unwrap();
        assert_eq!(list_products(&conn, None, None).unwrap().len(), 2);
    }

    #[test]
    fn test_create_product_rejects_non_positive_price() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        let mut product = new_product("Hoodie", "Tops", Gender::Male);
        product.price = 0;
        assert!(matches!(create_product(&mut conn, &product), Err(AppError::Validation(_))));
        assert!(list_categories(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_list_products_filters() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        create_product(&mut conn, &new_product("Dress", "Tops", Gender::Female)).unwrap();
        create_product(&mut conn, &new_product("Sneakers", "Shoes", Gender::Male)).unwrap();

        let male = list_products(&conn, Some(Gender::Male), None).unwrap();
        assert_eq!(male.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Hoodie", "Sneakers"]);

        let male_tops = list_products(&conn, Some(Gender::Male), Some("Tops")).unwrap();
        assert_eq!(male_tops.len(), 1);
        assert_eq!(male_tops[0].name, "Hoodie");

        let shoes = list_products(&conn, None, Some("Shoes")).unwrap();
        assert_eq!(shoes.len(), 1);
    }

    #[test]
    fn test_list_categories_by_gender_counts_only_matching() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        create_product(&mut conn, &new_product("Dress", "Tops", Gender::Female)).unwrap();
        create_product(&mut conn, &new_product("Heels", "Shoes", Gender::Female)).unwrap();
        create_category(&mut conn, "Empty").unwrap();

        let female = list_categories(&conn, Some(Gender::Female)).unwrap();
        let names: Vec<_> = female.iter().map(|c| (c.name.as_str(), c.products_count)).collect();
        assert_eq!(names, vec![("Shoes", 1), ("Tops", 1)]);

        let all = list_categories(&conn, None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|c| c.name == "Empty" && c.products_count == 0));
    }

    #[test]
    fn test_create_category_duplicate() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        let created = create_category(&mut conn, "Tops").unwrap();
        let err = create_category(&mut conn, "Tops").unwrap_err();
        assert_eq!(err.to_string(), "Category with this name already exists");
        assert_eq!(get_category(&conn, created.id).unwrap(), Some(created));
        assert_eq!(get_category(&conn, 999).unwrap(), None);
    }

    #[test]
    fn test_delete_category_cascades() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        create_product(&mut conn, &new_product("Dress", "Tops", Gender::Female)).unwrap();
        create_product(&mut conn, &new_product("Sneakers", "Shoes", Gender::Male)).unwrap();

        assert_eq!(delete_category_by_name(&mut conn, "Tops").unwrap(), 2);

        let remaining = list_products(&conn, None, None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Sneakers");
        assert!(list_categories(&conn, None).unwrap().iter().all(|c| c.name != "Tops"));

        assert!(matches!(
            delete_category_by_name(&mut conn, "Tops"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_product() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        let created = create_product(&mut conn, &new_product("Hoodie", "Tops", Gender::Male)).unwrap();
        delete_product(&mut conn, created.id).unwrap();
        assert_eq!(get_product(&conn, created.id).unwrap(), None);
        assert!(matches!(delete_product(&mut conn, created.id), Err(AppError::NotFound(_))));
    }
}
