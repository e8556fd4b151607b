//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and password login
//! - `orders` - Checkout (cart to order) and order queries

pub mod auth;
pub mod orders;
