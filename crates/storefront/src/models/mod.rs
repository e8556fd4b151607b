//! Domain models for the storefront.
//!
//! These types represent validated domain objects, separate from database
//! row types and from the JSON views returned by route handlers.

pub mod customer;
pub mod order;
pub mod product;
pub mod session;

pub use customer::Customer;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, ProductSales};
pub use product::{Category, Product};
pub use session::{CurrentCustomer, keys as session_keys};
