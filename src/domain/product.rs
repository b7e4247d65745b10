//! Product entity and stock arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound on a product's stock counter.
pub const MAX_QUANTITY: i32 = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(skip_serializing)]
    pub admin_id: Option<i64>,
}

impl Product {
    /// Decrements stock by `quantity`. Returns `false` (leaving stock
    /// untouched) when fewer than `quantity` units are available.
    pub fn reduce_quantity(&mut self, quantity: i32) -> bool {
        if self.stock < quantity {
            return false;
        }
        self.stock -= quantity;
        true
    }

    /// Increments stock by `quantity`. Returns `false` (leaving stock
    /// untouched) when the result would exceed [`MAX_QUANTITY`].
    pub fn increase_quantity(&mut self, quantity: i32) -> bool {
        if self.stock + quantity > MAX_QUANTITY {
            return false;
        }
        self.stock += quantity;
        true
    }

    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        Product {
            id: 1,
            name: "Widget".into(),
            description: String::new(),
            price: Decimal::new(1000, 2),
            stock,
            admin_id: None,
        }
    }

    #[test]
    fn reduce_within_stock() {
        let mut p = product(5);
        assert!(p.reduce_quantity(5));
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn reduce_past_stock_is_a_no_op() {
        let mut p = product(1);
        assert!(!p.reduce_quantity(2));
        assert_eq!(p.stock, 1);
    }

    #[test]
    fn increase_up_to_capacity() {
        let mut p = product(MAX_QUANTITY - 3);
        assert!(p.increase_quantity(3));
        assert_eq!(p.stock, MAX_QUANTITY);
        assert!(!p.increase_quantity(1));
        assert_eq!(p.stock, MAX_QUANTITY);
    }
}
