//! HTTP surface: router assembly and shared request plumbing.

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod cart;
pub mod orders;
pub mod products;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Common `?page&size` query parameters, zero-based page.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::remove),
        )
        .route("/api/products/:id/stock", put(products::adjust_stock))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/remove", delete(cart::remove))
        .route("/api/cart", get(cart::details))
        .route("/api/cart/total", get(cart::total))
        .route("/api/orders/createOrderFromCart", post(orders::create_from_cart))
        .route("/api/orders/user/:userId", get(orders::list_for_user))
        .route("/api/orders/:orderId", get(orders::get))
        .route("/api/orders/:orderId/updateStatus", put(orders::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "shop-backend"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_defaults_and_clamping() {
        let defaults = PageParams {
            page: None,
            size: None,
        };
        assert_eq!(defaults.page(), 0);
        assert_eq!(defaults.size(), DEFAULT_PAGE_SIZE);

        let oversized = PageParams {
            page: Some(3),
            size: Some(10_000),
        };
        assert_eq!(oversized.page(), 3);
        assert_eq!(oversized.size(), MAX_PAGE_SIZE);

        let zero = PageParams {
            page: Some(0),
            size: Some(0),
        };
        assert_eq!(zero.size(), 1);
    }
}
