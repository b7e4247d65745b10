//! Order endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::Identity;
use crate::domain::order::OrderStatus;
use crate::error::ShopError;
use crate::routes::PageParams;
use crate::service::order::OrderResponse;
use crate::service::PaginatedResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusParams {
    pub new_status: String,
}

/// Converts the authenticated user's cart into an order.
pub async fn create_from_cart(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<OrderResponse>, ShopError> {
    let order = state
        .orders
        .create_order_from_cart(identity.user_id)
        .await?;
    Ok(Json(order))
}

pub async fn get(
    State(state): State<AppState>,
    identity: Identity,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderResponse>, ShopError> {
    let order = state.orders.get_order(order_id, &identity).await?;
    Ok(Json(order))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, ShopError> {
    let orders = state
        .orders
        .get_orders_for_user(user_id, &identity, params.page(), params.size())
        .await?;
    Ok(Json(orders))
}

pub async fn update_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(order_id): Path<i64>,
    Query(params): Query<UpdateStatusParams>,
) -> Result<StatusCode, ShopError> {
    identity.require_admin()?;
    let status = OrderStatus::parse(&params.new_status)?;
    state.orders.update_status(order_id, status).await?;
    Ok(StatusCode::OK)
}
