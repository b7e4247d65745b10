//! Persistence-backed services over the domain types.

use serde::Serialize;

pub mod cart;
pub mod order;
pub mod product;

/// One page of results.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
}
