//! Error taxonomy and its translation to HTTP responses.
//!
//! Business failures (`InsufficientStock`, `EmptyCart`, ...) are expected
//! and map to 4xx responses; everything else is a defect, logged at the
//! boundary and surfaced as a sanitized 500. Every response body uses the
//! same envelope: status code, timestamp, message, description.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("product with id {0} is not found")]
    ProductNotFound(i64),

    #[error("user with id {0} is not found or has invalid details")]
    UserNotFound(i64),

    #[error("order with id {0} is not found")]
    OrderNotFound(i64),

    #[error("insufficient stock for product: {0}")]
    InsufficientStock(String),

    #[error("stock capacity exceeded for product with id {0}")]
    CapacityExceeded(i64),

    #[error("cannot create order from an empty cart")]
    EmptyCart,

    #[error("product with id {0} is referenced by existing orders or carts")]
    ProductInUse(i64),

    #[error("product with name {name} and price {price} already exists")]
    DuplicateProduct { name: String, price: String },

    #[error("unknown order status: {0}")]
    InvalidStatus(String),

    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied: you don't have permissions for this action")]
    AccessDenied,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ShopError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::ProductNotFound(_)
            | ShopError::UserNotFound(_)
            | ShopError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            ShopError::InsufficientStock(_)
            | ShopError::CapacityExceeded(_)
            | ShopError::EmptyCart
            | ShopError::InvalidStatus(_)
            | ShopError::Validation(_) => StatusCode::BAD_REQUEST,
            ShopError::ProductInUse(_) | ShopError::DuplicateProduct { .. } => {
                StatusCode::CONFLICT
            }
            ShopError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ShopError::AccessDenied => StatusCode::FORBIDDEN,
            ShopError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Uniform wire shape for every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub description: String,
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Never leak driver internals to the client.
            ShopError::Database(err) => {
                tracing::error!(error = %err, "database error");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorMessage {
            status_code: status.as_u16(),
            timestamp: Utc::now(),
            message,
            description: status
                .canonical_reason()
                .unwrap_or("unknown")
                .to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field}: {detail}")
            })
            .collect();
        fields.sort();
        ShopError::Validation(fields.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_4xx() {
        assert_eq!(
            ShopError::ProductNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::UserNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::OrderNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::InsufficientStock("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ShopError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ShopError::AccessDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ShopError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn persistence_failures_map_to_500() {
        assert_eq!(
            ShopError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_names_the_product() {
        let err = ShopError::InsufficientStock("Widget".into());
        assert_eq!(err.to_string(), "insufficient stock for product: Widget");
    }
}
