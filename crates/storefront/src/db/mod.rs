//! Database operations for the boutique `PostgreSQL`.
//!
//! ## Tables (schema `boutique`)
//!
//! - `category` - Catalog shelves
//! - `product` - Catalog products (label, description, unit price)
//! - `customer` - Registered customers
//! - `customer_password` - Argon2 password hashes
//! - `customer_order` - Orders (one per checkout)
//! - `order_line` - Order lines with the price captured at checkout
//!
//! Sessions (including the cart) live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p boutique-cli -- migrate
//! ```

pub mod catalog;
pub mod customers;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a database `INTEGER` quantity into a `u32`.
fn quantity_from_db(raw: i32) -> Result<u32, RepositoryError> {
    u32::try_from(raw).map_err(|_| {
        RepositoryError::DataCorruption(format!("negative quantity {raw} in database"))
    })
}

/// Convert a `u32` quantity into a database `INTEGER`.
fn quantity_to_db(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::Conflict(format!("quantity {quantity} exceeds column range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_conversions() {
        assert_eq!(quantity_from_db(4).ok(), Some(4));
        assert!(matches!(
            quantity_from_db(-1),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert_eq!(quantity_to_db(7).ok(), Some(7));
        assert!(matches!(
            quantity_to_db(u32::MAX),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
