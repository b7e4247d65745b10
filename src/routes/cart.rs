//! Cart endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Identity;
use crate::domain::cart::CartLineView;
use crate::error::ShopError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartParams {
    pub product_id: i64,
}

/// Cart projection; `message` is informational only and set for an empty
/// cart, which is not an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<AddToCartRequest>,
) -> Result<StatusCode, ShopError> {
    req.validate()?;
    state
        .carts
        .add_product(identity.user_id, req.product_id, req.quantity)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<RemoveFromCartParams>,
) -> Result<StatusCode, ShopError> {
    state
        .carts
        .remove_product(identity.user_id, params.product_id)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn details(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CartResponse>, ShopError> {
    let items = state.carts.get_cart_details(identity.user_id).await?;
    let message = items.is_empty().then(|| "Your cart is empty".to_string());
    Ok(Json(CartResponse { items, message }))
}

pub async fn total(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Decimal>, ShopError> {
    let total = state.carts.calculate_total(identity.user_id).await?;
    Ok(Json(total))
}
