//! Boutique storefront server.
//!
//! Serves the JSON API for catalog browsing, the session cart, checkout and
//! order history. Migrations are applied separately with
//! `boutique-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use boutique_storefront::config::StorefrontConfig;
use boutique_storefront::state::AppState;
use boutique_storefront::{db, server, telemetry};

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    let sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let addr = config.socket_addr();
    let app = server::app(AppState::new(config, pool));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .expect("Server error");
}
