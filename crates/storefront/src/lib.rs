//! Boutique storefront library.
//!
//! Catalog browsing, a session-backed cart, and checkout into persisted
//! orders. The library is what the `boutique-storefront` binary serves and
//! what the integration tests drive.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod telemetry;
