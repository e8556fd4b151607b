//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET  /catalog/categories                - Category listing
//! GET  /catalog/categories/{id}/products  - Products of a category
//! GET  /catalog/search/{term}             - Label/description search
//! GET  /catalog/products/{id}             - Product detail
//! GET  /catalog/top-sellers               - Best-selling products
//!
//! # Cart
//! GET  /cart                   - Cart contents and total
//! GET  /cart/count             - Unit count
//! POST /cart/add               - Add units (product_id, quantity=1)
//! POST /cart/remove            - Remove units (product_id, quantity=1)
//! POST /cart/delete            - Drop a product (product_id)
//! POST /cart/clear             - Empty the cart
//! POST /cart/checkout          - Create an order (requires auth)
//!
//! # Auth
//! POST /auth/register          - Register and log in
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account/orders         - Order history
//! GET  /account/orders/{id}    - Order detail
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/categories/{id}/products", get(catalog::category_products))
        .route("/search/{term}", get(catalog::search))
        .route("/products/{id}", get(catalog::product))
        .route("/top-sellers", get(catalog::best_sellers))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/delete", post(cart::delete))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
