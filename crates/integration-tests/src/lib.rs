//! Integration tests for the boutique.
//!
//! The tests in `tests/` drive the storefront library end to end with the
//! in-memory catalog and order store and a `tower_sessions::MemoryStore`
//! standing in for the `PostgreSQL` session table, so no database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```
