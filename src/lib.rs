//! Shop backend
//!
//! E-commerce backend service: product catalog, per-user shopping carts,
//! and transactional checkout against a PostgreSQL database.
//!
//! ## Features
//! - Product catalog with admin-managed stock
//! - Shopping cart with accumulating add-to-cart
//! - Atomic cart-to-order checkout (no overselling, no partial orders)
//! - Order queries with ownership-or-admin authorization

use sqlx::PgPool;

use crate::service::{cart::CartService, order::OrderService, product::ProductService};

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod routes;
pub mod service;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub products: ProductService,
    pub carts: CartService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self {
            products: ProductService::new(db.clone()),
            carts: CartService::new(db.clone()),
            orders: OrderService::new(db.clone()),
            db,
        }
    }
}
