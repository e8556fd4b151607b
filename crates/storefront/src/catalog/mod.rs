//! Catalog lookup capability.
//!
//! The cart and checkout only ever read the catalog through
//! [`CatalogLookup`]. Looking up an ID that no longer exists is not an error:
//! it yields `Ok(None)`, and callers decide to skip the entry.
//!
//! Implementations:
//! - [`CatalogRepository`](crate::db::CatalogRepository) - `PostgreSQL`
//! - [`InMemoryCatalog`] - process-local, used by tests and demos

mod memory;

use std::future::Future;

use boutique_core::{CategoryId, ProductId};

use crate::db::RepositoryError;
use crate::models::{Category, Product};

pub use memory::InMemoryCatalog;

/// Read access to products and categories.
pub trait CatalogLookup: Send + Sync {
    /// Find a product by ID. Missing products resolve to `None`.
    fn find_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// All products on a category's shelf, ordered by label.
    fn find_by_category(
        &self,
        category: CategoryId,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Products whose label or description contains `term`, ordered by label.
    ///
    /// Matching is a case-insensitive substring test; there is no ranking.
    fn search(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// All categories, ordered by name.
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;
}
