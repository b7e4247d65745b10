//! Product catalog endpoints. Reads are public; mutations are admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::auth::Identity;
use crate::domain::product::Product;
use crate::error::ShopError;
use crate::routes::PageParams;
use crate::service::product::NewProduct;
use crate::service::PaginatedResponse;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 1, max = 10_000, message = "must be between 1 and 10000"))]
    pub stock: i32,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut err = ValidationError::new("negative_price");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

impl From<ProductRequest> for NewProduct {
    fn from(req: ProductRequest) -> Self {
        NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            stock: req.stock,
        }
    }
}

/// Signed stock adjustment: positive restocks, negative removes units.
#[derive(Debug, Deserialize, Validate)]
pub struct StockAdjustmentRequest {
    #[validate(range(min = -10_000, max = 10_000, message = "out of range"))]
    pub adjustment: i32,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedResponse<Product>>, ShopError> {
    let products = state
        .products
        .list_products(params.page(), params.size())
        .await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ShopError> {
    let product = state.products.get_product(id).await?;
    Ok(Json(product))
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ShopError> {
    identity.require_admin()?;
    req.validate()?;
    let product = state
        .products
        .create_product(req.into(), identity.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ShopError> {
    identity.require_admin()?;
    req.validate()?;
    let product = state
        .products
        .update_product(id, req.into(), identity.user_id)
        .await?;
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> Result<StatusCode, ShopError> {
    identity.require_admin()?;
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(req): Json<StockAdjustmentRequest>,
) -> Result<Json<Product>, ShopError> {
    identity.require_admin()?;
    req.validate()?;
    let product = state.products.adjust_stock(id, req.adjustment).await?;
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::MAX_QUANTITY;

    #[test]
    fn rejects_negative_price_and_out_of_range_stock() {
        let req = ProductRequest {
            name: "Widget".into(),
            description: String::new(),
            price: Decimal::new(-1, 2),
            stock: MAX_QUANTITY + 1,
        };
        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
    }

    #[test]
    fn accepts_a_well_formed_product() {
        let req = ProductRequest {
            name: "Widget".into(),
            description: "A widget".into(),
            price: Decimal::new(1999, 2),
            stock: 5,
        };
        assert!(req.validate().is_ok());
    }
}
