//! Cart entity, its line items, and the total-cost computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart per user, created lazily on first use.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
}

/// Composite identity of a cart line. Two lines for the same product in
/// the same cart are the same entity regardless of quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CartItemId {
    pub cart_id: i64,
    pub product_id: i64,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CartItem {
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

impl CartItem {
    pub fn key(&self) -> CartItemId {
        CartItemId {
            cart_id: self.cart_id,
            product_id: self.product_id,
        }
    }
}

/// Read-only cart line joined with current product data.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Sums `unit_price * quantity` over the given lines at current prices.
/// Decimal accumulation throughout; rounded to cents at the end.
pub fn total_cost(lines: &[CartLineView]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| {
            acc + line.unit_price * Decimal::from(line.quantity)
        })
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i32, cents: i64) -> CartLineView {
        CartLineView {
            product_id,
            product_name: format!("product-{product_id}"),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn item_identity_ignores_quantity() {
        let a = CartItem {
            cart_id: 7,
            product_id: 3,
            quantity: 1,
        };
        let b = CartItem {
            cart_id: 7,
            product_id: 3,
            quantity: 9,
        };
        assert_eq!(a.key(), b.key());
        assert_ne!(
            a.key(),
            CartItemId {
                cart_id: 8,
                product_id: 3
            }
        );
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let lines = vec![line(1, 2, 1000), line(2, 1, 500)];
        assert_eq!(total_cost(&lines), Decimal::new(2500, 2));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(total_cost(&[]), Decimal::ZERO);
    }
}
