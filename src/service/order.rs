//! Order placement and order queries.
//!
//! [`OrderService::create_order_from_cart`] is the checkout orchestrator:
//! one database transaction validates the cart, reprices it, locks the
//! product rows, materializes the order with price snapshots, decrements
//! stock through the ledger, and clears the cart. Any failure rolls the
//! whole attempt back; a partially placed order is never observable.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::Identity;
use crate::domain::cart::CartItem;
use crate::domain::order::{Order, OrderDraft, OrderStatus, INITIAL_STATUS};
use crate::domain::product::Product;
use crate::domain::user::User;
use crate::error::ShopError;
use crate::service::{cart, product, PaginatedResponse};

/// Flattened order view returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: String,
    pub products: Vec<OrderProductResponse>,
}

/// One order line: quantity and the unit price recorded at purchase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductResponse {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i32,
    price: Decimal,
}

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Converts the user's cart into a persisted order, atomically.
    ///
    /// Inside one transaction: the owning user is checked for valid
    /// details, the cart must be non-empty, every referenced product row
    /// is locked (`FOR UPDATE`, in id order so concurrent checkouts
    /// cannot deadlock), stock is validated against the locked rows, the
    /// total is recomputed from current prices, the order and its line
    /// snapshots are inserted, stock is decremented through the ledger,
    /// and the cart is cleared. The row locks close the window between
    /// the stock check and the decrement: of two checkouts racing for
    /// the last unit, exactly one commits.
    pub async fn create_order_from_cart(&self, user_id: i64) -> Result<OrderResponse, ShopError> {
        let mut tx = self.pool.begin().await?;

        let user: Option<User> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let user = match user {
            Some(user) if user.has_valid_details() => user,
            _ => return Err(ShopError::UserNotFound(user_id)),
        };

        let cart_id: Option<i64> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(cart_id) = cart_id else {
            return Err(ShopError::EmptyCart);
        };

        let items: Vec<CartItem> = sqlx::query_as(
            "SELECT cart_id, product_id, quantity FROM cart_items \
             WHERE cart_id = $1 ORDER BY product_id",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        let product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
        let locked: Vec<Product> = sqlx::query_as(
            "SELECT id, name, description, price, stock, admin_id FROM products \
             WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?;
        let products: HashMap<i64, Product> = locked.into_iter().map(|p| (p.id, p)).collect();

        let draft = OrderDraft::build(&items, &products)?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (user_id, order_date, total_price, status) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user.id)
        .bind(Utc::now())
        .bind(draft.total)
        .bind(INITIAL_STATUS.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO order_products (order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;

            // Already validated against the locked rows; the conditional
            // decrement still guards the ledger, and any failure here
            // rolls back the order and every earlier decrement.
            product::reduce_stock(&mut tx, line.product_id, line.quantity).await?;
        }

        cart::clear_cart(&mut tx, cart_id).await?;

        tx.commit().await?;

        tracing::info!(order_id, user_id, total = %draft.total, "order created from cart");
        self.order_response(order_id).await
    }

    /// Fetches one order, enforcing the ownership-or-admin rule.
    pub async fn get_order(
        &self,
        order_id: i64,
        identity: &Identity,
    ) -> Result<OrderResponse, ShopError> {
        let order = self.find_order(order_id).await?;
        if !identity.can_access(order.user_id) {
            return Err(ShopError::AccessDenied);
        }
        self.response_for(order).await
    }

    /// Pages through a user's orders, newest first. The requester must
    /// be that user or an admin.
    pub async fn get_orders_for_user(
        &self,
        user_id: i64,
        identity: &Identity,
        page: u32,
        size: u32,
    ) -> Result<PaginatedResponse<OrderResponse>, ShopError> {
        if !identity.can_access(user_id) {
            return Err(ShopError::AccessDenied);
        }

        let orders: Vec<Order> = sqlx::query_as(
            "SELECT id, user_id, order_date, total_price, status FROM orders \
             WHERE user_id = $1 ORDER BY order_date DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(size as i64)
        .bind(page as i64 * size as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let lines: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT op.order_id, op.product_id, p.name AS product_name, op.quantity, op.price \
             FROM order_products op \
             JOIN products p ON p.id = op.product_id \
             WHERE op.order_id = ANY($1) ORDER BY op.id",
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<i64, Vec<OrderProductResponse>> = HashMap::new();
        for line in lines {
            lines_by_order
                .entry(line.order_id)
                .or_default()
                .push(line_response(line));
        }

        let data = orders
            .into_iter()
            .map(|order| OrderResponse {
                products: lines_by_order.remove(&order.id).unwrap_or_default(),
                id: order.id,
                order_date: order.order_date,
                total_price: order.total_price,
                status: order.status,
            })
            .collect();

        Ok(PaginatedResponse {
            data,
            total,
            page,
            size,
        })
    }

    /// Overwrites an order's status. Admin gating happens at the route;
    /// no transition graph is enforced here — which transitions an admin
    /// may make is deployment policy.
    pub async fn update_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<(), ShopError> {
        let updated = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id)
            .bind(new_status.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ShopError::OrderNotFound(order_id));
        }
        tracing::info!(order_id, status = %new_status, "order status updated");
        Ok(())
    }

    async fn find_order(&self, order_id: i64) -> Result<Order, ShopError> {
        sqlx::query_as::<_, Order>(
            "SELECT id, user_id, order_date, total_price, status FROM orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ShopError::OrderNotFound(order_id))
    }

    async fn order_response(&self, order_id: i64) -> Result<OrderResponse, ShopError> {
        let order = self.find_order(order_id).await?;
        self.response_for(order).await
    }

    async fn response_for(&self, order: Order) -> Result<OrderResponse, ShopError> {
        let lines: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT op.order_id, op.product_id, p.name AS product_name, op.quantity, op.price \
             FROM order_products op \
             JOIN products p ON p.id = op.product_id \
             WHERE op.order_id = $1 ORDER BY op.id",
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderResponse {
            id: order.id,
            order_date: order.order_date,
            total_price: order.total_price,
            status: order.status,
            products: lines.into_iter().map(line_response).collect(),
        })
    }
}

fn line_response(line: OrderLineRow) -> OrderProductResponse {
    OrderProductResponse {
        product_id: line.product_id,
        product_name: line.product_name,
        quantity: line.quantity,
        price: line.price,
    }
}
