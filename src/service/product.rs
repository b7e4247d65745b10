//! Product catalog operations and the stock ledger.
//!
//! The ledger functions ([`reduce_stock`], [`increase_stock`]) are the
//! only writers of `products.stock`. Both are atomic conditional updates
//! checked by affected-row count, and both run on whatever connection the
//! caller supplies, so checkout can execute them inside its own
//! transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::domain::product::{Product, MAX_QUANTITY};
use crate::error::ShopError;
use crate::service::PaginatedResponse;

/// Postgres error code for foreign-key violations.
const FK_VIOLATION: &str = "23503";

/// Decrements a product's stock by `quantity`, failing without side
/// effects when fewer units are available. The check and the decrement
/// are one statement, so two concurrent callers can never both take the
/// last unit.
pub async fn reduce_stock(
    conn: &mut PgConnection,
    product_id: i64,
    quantity: i32,
) -> Result<(), ShopError> {
    let updated = sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if updated == 1 {
        return Ok(());
    }

    // Distinguish "not enough stock" from "no such product".
    let name: Option<String> = sqlx::query_scalar("SELECT name FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    match name {
        Some(name) => Err(ShopError::InsufficientStock(name)),
        None => Err(ShopError::ProductNotFound(product_id)),
    }
}

/// Increments a product's stock by `quantity`, failing without side
/// effects when the result would exceed [`MAX_QUANTITY`].
pub async fn increase_stock(
    conn: &mut PgConnection,
    product_id: i64,
    quantity: i32,
) -> Result<(), ShopError> {
    let updated = sqlx::query(
        "UPDATE products SET stock = stock + $2 WHERE id = $1 AND stock + $2 <= $3",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(MAX_QUANTITY)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 1 {
        return Ok(());
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        Err(ShopError::CapacityExceeded(product_id))
    } else {
        Err(ShopError::ProductNotFound(product_id))
    }
}

/// Catalog data for a new or updated product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Clone)]
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ShopError> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock, admin_id FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ShopError::ProductNotFound(id))
    }

    pub async fn list_products(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PaginatedResponse<Product>, ShopError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock, admin_id FROM products \
             ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(size as i64)
        .bind(page as i64 * size as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(PaginatedResponse {
            data: products,
            total,
            page,
            size,
        })
    }

    pub async fn create_product(
        &self,
        data: NewProduct,
        admin_id: i64,
    ) -> Result<Product, ShopError> {
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND price = $2)",
        )
        .bind(&data.name)
        .bind(data.price)
        .fetch_one(&self.pool)
        .await?;
        if duplicate {
            return Err(ShopError::DuplicateProduct {
                name: data.name,
                price: data.price.to_string(),
            });
        }

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, description, price, stock, admin_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, price, stock, admin_id",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(product_id = product.id, admin_id, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: i64,
        data: NewProduct,
        admin_id: i64,
    ) -> Result<Product, ShopError> {
        sqlx::query_as::<_, Product>(
            "UPDATE products SET name = $2, description = $3, price = $4, stock = $5, admin_id = $6 \
             WHERE id = $1 \
             RETURNING id, name, description, price, stock, admin_id",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ShopError::ProductNotFound(id))
    }

    /// Deletes a product. Rows still referenced by cart lines or order
    /// snapshots are protected by foreign keys; deleting one surfaces as
    /// a conflict rather than breaking placed orders.
    pub async fn delete_product(&self, id: i64) -> Result<(), ShopError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(()),
            Ok(_) => Err(ShopError::ProductNotFound(id)),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(FK_VIOLATION) => {
                Err(ShopError::ProductInUse(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Adjusts stock through the ledger: positive adds units (bounded by
    /// [`MAX_QUANTITY`]), negative removes them (bounded by zero).
    pub async fn adjust_stock(&self, id: i64, adjustment: i32) -> Result<Product, ShopError> {
        if adjustment == 0 {
            return self.get_product(id).await;
        }

        let mut conn = self.pool.acquire().await?;
        if adjustment > 0 {
            increase_stock(&mut conn, id, adjustment).await?;
        } else {
            reduce_stock(&mut conn, id, -adjustment).await?;
        }
        drop(conn);

        self.get_product(id).await
    }
}
