//! Order entity, line-item price snapshots, and the checkout draft.
//!
//! An order is immutable after creation: every line records the quantity
//! and the unit price as they were at the moment of purchase. The
//! [`OrderDraft`] holds the validated, priced lines for one checkout
//! attempt before anything is persisted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartItem;
use crate::domain::product::Product;
use crate::error::ShopError;

/// Initial status assigned to every order; all later transitions come
/// from the admin status-update path.
pub const INITIAL_STATUS: OrderStatus = OrderStatus::Pending;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses the wire/database representation. Any status is reachable
    /// from any other; transition legality is admin policy, not enforced
    /// here.
    pub fn parse(value: &str) -> Result<Self, ShopError> {
        match value {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ShopError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: String,
}

/// Persisted order line: quantity and unit price frozen at purchase time.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct OrderProduct {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// One line of a checkout in flight: the price snapshot taken from the
/// product row locked by the enclosing transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Validated and priced cart contents, ready to be persisted as an order.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub lines: Vec<DraftLine>,
    pub total: Decimal,
}

impl OrderDraft {
    /// Builds a draft from cart lines and the product rows they reference.
    ///
    /// Fails with `EmptyCart` when there are no lines or the total is not
    /// positive, with `ProductNotFound` when a line references a missing
    /// product, and with `InsufficientStock` (naming the product) when any
    /// line asks for more than is available. The whole draft fails on the
    /// first offending line; nothing is partially reserved.
    pub fn build(
        items: &[CartItem],
        products: &HashMap<i64, Product>,
    ) -> Result<Self, ShopError> {
        if items.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = products
                .get(&item.product_id)
                .ok_or(ShopError::ProductNotFound(item.product_id))?;
            if !product.has_stock_for(item.quantity) {
                return Err(ShopError::InsufficientStock(product.name.clone()));
            }
            lines.push(DraftLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        let total = lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| {
                acc + line.unit_price * Decimal::from(line.quantity)
            })
            .round_dp(2);

        if total <= Decimal::ZERO {
            return Err(ShopError::EmptyCart);
        }

        Ok(Self { lines, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, cents: i64, stock: i32) -> Product {
        Product {
            id,
            name: format!("product-{id}"),
            description: String::new(),
            price: Decimal::new(cents, 2),
            stock,
            admin_id: None,
        }
    }

    fn item(product_id: i64, quantity: i32) -> CartItem {
        CartItem {
            cart_id: 1,
            product_id,
            quantity,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn draft_totals_and_snapshots_prices() {
        // A: 10.00 x2, B: 5.00 x1 -> 25.00
        let products = catalog(vec![product(1, 1000, 5), product(2, 500, 1)]);
        let draft = OrderDraft::build(&[item(1, 2), item(2, 1)], &products).unwrap();
        assert_eq!(draft.total, Decimal::new(2500, 2));
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].unit_price, Decimal::new(1000, 2));
    }

    #[test]
    fn draft_rejects_insufficient_stock_naming_the_product() {
        let products = catalog(vec![product(3, 700, 1)]);
        let err = OrderDraft::build(&[item(3, 2)], &products).unwrap_err();
        match err {
            ShopError::InsufficientStock(name) => assert_eq!(name, "product-3"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn draft_rejects_empty_cart() {
        let products = catalog(vec![]);
        assert!(matches!(
            OrderDraft::build(&[], &products),
            Err(ShopError::EmptyCart)
        ));
    }

    #[test]
    fn draft_rejects_zero_total() {
        let products = catalog(vec![product(4, 0, 10)]);
        assert!(matches!(
            OrderDraft::build(&[item(4, 2)], &products),
            Err(ShopError::EmptyCart)
        ));
    }

    #[test]
    fn draft_rejects_missing_product() {
        let products = catalog(vec![]);
        assert!(matches!(
            OrderDraft::build(&[item(9, 1)], &products),
            Err(ShopError::ProductNotFound(9))
        ));
    }

    #[test]
    fn snapshot_price_survives_later_product_repricing() {
        let mut products = catalog(vec![product(1, 1000, 5)]);
        let draft = OrderDraft::build(&[item(1, 2)], &products).unwrap();

        // Reprice the product after the draft was taken.
        products.get_mut(&1).unwrap().price = Decimal::new(9999, 2);

        assert_eq!(draft.lines[0].unit_price, Decimal::new(1000, 2));
        assert_eq!(draft.total, Decimal::new(2000, 2));
    }

    #[test]
    fn status_round_trips_through_its_wire_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            OrderStatus::parse("REFUNDED"),
            Err(ShopError::InvalidStatus(_))
        ));
    }
}
