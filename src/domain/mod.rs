//! Domain entities and their invariant logic.
//!
//! Everything here is pure: row types, identity keys, and the arithmetic
//! that the persistence layer mirrors in SQL. The services in
//! [`crate::service`] are the only place these types meet the database.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
