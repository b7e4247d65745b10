//! Shopping-cart operations.
//!
//! Carts are created lazily on first use, at most one per user (the
//! unique constraint on `carts.user_id` is the backstop when two first
//! requests race). Adding a product that is already in the cart
//! accumulates its quantity in a single upsert, so retried or rapid
//! duplicate requests never produce duplicate lines or lost increments.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::domain::cart::{self, Cart, CartLineView};
use crate::error::ShopError;

/// Postgres error code for foreign-key violations.
const FK_VIOLATION: &str = "23503";

/// Removes every line from a cart. Idempotent: an already-empty cart is
/// a no-op success. Runs on the caller's connection so checkout can
/// clear the cart inside its transaction.
pub async fn clear_cart(conn: &mut PgConnection, cart_id: i64) -> Result<(), ShopError> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct CartService {
    pool: PgPool,
}

impl CartService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the user's cart, creating an empty one on first access.
    pub async fn get_or_create_cart(&self, user_id: i64) -> Result<Cart, ShopError> {
        let inserted = sqlx::query(
            "INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await;

        if let Err(sqlx::Error::Database(db)) = &inserted {
            if db.code().as_deref() == Some(FK_VIOLATION) {
                return Err(ShopError::UserNotFound(user_id));
            }
        }
        inserted?;

        sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_cart(&self, user_id: i64) -> Result<Option<Cart>, ShopError> {
        sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Adds `quantity` units of a product to the user's cart, creating
    /// the line or accumulating onto the existing one.
    ///
    /// The stock check here is advisory, for early feedback at add time;
    /// checkout re-checks under a row lock and is the authority.
    pub async fn add_product(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<(), ShopError> {
        if quantity <= 0 {
            return Err(ShopError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let product: Option<(String, i32)> =
            sqlx::query_as("SELECT name, stock FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        let (name, stock) = product.ok_or(ShopError::ProductNotFound(product_id))?;
        if stock < quantity {
            return Err(ShopError::InsufficientStock(name));
        }

        let cart = self.get_or_create_cart(user_id).await?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart.id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id, product_id, quantity, "product added to cart");
        Ok(())
    }

    /// Removes a product's line from the user's cart. Absent line (or
    /// absent cart) is a no-op success.
    pub async fn remove_product(&self, user_id: i64, product_id: i64) -> Result<(), ShopError> {
        let Some(cart) = self.find_cart(user_id).await? else {
            return Ok(());
        };

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read-only projection of the cart joined with current product data,
    /// ordered by product id. An empty (or not-yet-created) cart yields
    /// an empty list.
    pub async fn get_cart_details(&self, user_id: i64) -> Result<Vec<CartLineView>, ShopError> {
        sqlx::query_as::<_, CartLineView>(
            "SELECT p.id AS product_id, p.name AS product_name, ci.quantity, p.price AS unit_price \
             FROM carts c \
             JOIN cart_items ci ON ci.cart_id = c.id \
             JOIN products p ON p.id = ci.product_id \
             WHERE c.user_id = $1 \
             ORDER BY p.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Total cost of the cart at current prices. Live repricing: the
    /// displayed total follows product price changes until checkout
    /// freezes the snapshot.
    pub async fn calculate_total(&self, user_id: i64) -> Result<Decimal, ShopError> {
        let lines = self.get_cart_details(user_id).await?;
        Ok(cart::total_cost(&lines))
    }
}
