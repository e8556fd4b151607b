//! Session-backed shopping cart.
//!
//! A [`Cart`] is a mapping of product ID to desired quantity. A
//! [`CartManager`] loads it once per request from a [`CartStore`] (the
//! visitor's session) and writes it back after every mutation.
//!
//! The cart references products by ID only. When a product disappears from
//! the catalog:
//! - [`CartManager::contents`] and [`CartManager::total`] skip the entry,
//! - [`CartManager::item_count`] still counts its stored quantity,
//! - the stale ID stays in the mapping until it is removed explicitly.
//!
//! The count reads the raw mapping without touching the catalog, so the
//! badge count and the listed contents can disagree.

mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use boutique_core::{Price, ProductId};

use crate::catalog::CatalogLookup;
use crate::db::RepositoryError;
use crate::models::Product;

pub use store::CartStore;

/// Errors from cart operations.
///
/// A product missing from the catalog is never an error.
#[derive(Debug, Error)]
pub enum CartError {
    /// The session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The catalog backend failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] RepositoryError),
}

/// Product → quantity mapping.
///
/// Every stored quantity is at least 1. Entries iterate in ascending product
/// ID order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

impl Cart {
    /// Whether the mapping holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Stored quantity for a product, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Iterate `(product_id, quantity)` pairs in product ID order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Sum of all stored quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|qty| u64::from(*qty)).sum()
    }

    fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let stored = self.lines.entry(product_id).or_insert(0);
        *stored = stored.saturating_add(quantity);
    }

    /// Returns `false` if the product was not in the cart.
    fn remove(&mut self, product_id: ProductId, quantity: u32) -> bool {
        let Some(stored) = self.lines.get_mut(&product_id) else {
            return false;
        };
        if *stored <= quantity {
            self.lines.remove(&product_id);
        } else {
            *stored -= quantity;
        }
        true
    }

    fn delete(&mut self, product_id: ProductId) {
        self.lines.remove(&product_id);
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop entries that break the quantity invariant (e.g. a hand-edited session).
    fn sanitize(&mut self) {
        self.lines.retain(|_, qty| *qty > 0);
    }
}

/// A cart entry resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    /// Current unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.unit_price.times(self.quantity)
    }
}

/// The visitor's cart, bound to its backing store and the catalog.
pub struct CartManager<S, C> {
    store: S,
    catalog: C,
    cart: Cart,
}

impl<S, C> CartManager<S, C>
where
    S: CartStore,
    C: CatalogLookup,
{
    /// Load the cart from its store. An absent cart starts empty.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the store cannot be read.
    pub async fn load(store: S, catalog: C) -> Result<Self, CartError> {
        let mut cart = store.load_cart().await?;
        cart.sanitize();
        Ok(Self {
            store,
            catalog,
            cart,
        })
    }

    /// Add `quantity` units of a product. Adding zero units does nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn add_product(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Ok(());
        }
        self.cart.add(product_id, quantity);
        self.save().await
    }

    /// Remove `quantity` units of a product.
    ///
    /// Removing as many units as are stored, or more, takes the product out of
    /// the cart. Removing a product that is not in the cart does nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn remove_product(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if self.cart.remove(product_id, quantity) {
            self.save().await
        } else {
            Ok(())
        }
    }

    /// Take a product out of the cart regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.cart.delete(product_id);
        self.save().await
    }

    /// Empty the cart.
    ///
    /// The in-memory cart is emptied even if writing it back fails.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.save().await
    }

    /// Resolve every entry against the catalog, in product ID order.
    ///
    /// Entries whose product no longer exists are left out.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if a lookup fails.
    pub async fn contents(&self) -> Result<Vec<CartEntry>, CartError> {
        let mut entries = Vec::with_capacity(self.cart.len());
        for (product_id, quantity) in self.cart.iter() {
            match self.catalog.find_by_id(product_id).await? {
                Some(product) => entries.push(CartEntry { product, quantity }),
                None => {
                    tracing::debug!(%product_id, "product no longer in catalog, skipping");
                }
            }
        }
        Ok(entries)
    }

    /// Sum of `unit_price × quantity` over the entries that still resolve.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if a lookup fails.
    pub async fn total(&self) -> Result<Price, CartError> {
        Ok(self.contents().await?.iter().map(CartEntry::line_total).sum())
    }

    /// Sum of every stored quantity, including products the catalog no
    /// longer has.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Whether the underlying mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// The raw product → quantity mapping.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    async fn save(&self) -> Result<(), CartError> {
        self.store.save_cart(&self.cart).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use boutique_core::CategoryId;
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            label: format!("Product {id}"),
            description: String::new(),
            unit_price: Price::from_cents(cents),
            category_id: CategoryId::new(1),
        }
    }

    async fn catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(1, 1000)).await;
        catalog.insert_product(product(2, 500)).await;
        catalog
    }

    async fn manager(
        session: &Session,
        catalog: &InMemoryCatalog,
    ) -> CartManager<Session, InMemoryCatalog> {
        CartManager::load(session.clone(), catalog.clone())
            .await
            .unwrap()
    }

    const A: ProductId = ProductId::new(1);
    const B: ProductId = ProductId::new(2);

    #[tokio::test]
    async fn test_new_cart_is_empty() {
        let cart = manager(&session(), &catalog().await).await;
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.total().await.unwrap().is_zero());
        assert!(cart.contents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_accumulates_quantity() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 3).await.unwrap();
        cart.add_product(A, 2).await.unwrap();

        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.cart().quantity_of(A), Some(5));
    }

    #[tokio::test]
    async fn test_add_zero_does_not_create_entry() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 0).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_decrements_then_deletes() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 4).await.unwrap();

        cart.remove_product(A, 1).await.unwrap();
        assert_eq!(cart.cart().quantity_of(A), Some(3));

        cart.remove_product(A, 10).await.unwrap();
        assert_eq!(cart.cart().quantity_of(A), None);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_exact_quantity_deletes_entry() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(B, 2).await.unwrap();
        cart.remove_product(B, 2).await.unwrap();
        assert_eq!(cart.cart().quantity_of(B), None);
    }

    #[tokio::test]
    async fn test_remove_absent_product_is_noop() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 1).await.unwrap();
        cart.remove_product(B, 1).await.unwrap();
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_ignores_quantity() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 7).await.unwrap();
        cart.add_product(B, 1).await.unwrap();

        cart.delete_product(A).await.unwrap();
        cart.delete_product(ProductId::new(42)).await.unwrap();

        assert_eq!(cart.cart().quantity_of(A), None);
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_total_uses_catalog_prices() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(A, 2).await.unwrap();
        cart.add_product(B, 1).await.unwrap();

        assert_eq!(cart.total().await.unwrap(), Price::from_cents(2500));
    }

    #[tokio::test]
    async fn test_total_follows_live_price_changes() {
        let catalog = catalog().await;
        let mut cart = manager(&session(), &catalog).await;
        cart.add_product(A, 2).await.unwrap();

        catalog.set_price(A, Price::from_cents(1200)).await;

        assert_eq!(cart.total().await.unwrap(), Price::from_cents(2400));
    }

    #[tokio::test]
    async fn test_missing_product_skipped_in_contents_but_counted() {
        let catalog = catalog().await;
        let mut cart = manager(&session(), &catalog).await;
        cart.add_product(A, 2).await.unwrap();
        cart.add_product(B, 3).await.unwrap();

        catalog.remove_product(B).await;

        let contents = cart.contents().await.unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].product.id, A);
        assert_eq!(cart.total().await.unwrap(), Price::from_cents(2000));

        // The raw count still includes the vanished product.
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.cart().quantity_of(B), Some(3));
    }

    #[tokio::test]
    async fn test_contents_in_product_id_order() {
        let mut cart = manager(&session(), &catalog().await).await;
        cart.add_product(B, 1).await.unwrap();
        cart.add_product(A, 1).await.unwrap();

        let ids: Vec<_> = cart
            .contents()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.product.id)
            .collect();
        assert_eq!(ids, [A, B]);
    }

    #[tokio::test]
    async fn test_mutations_write_through_to_session() {
        let session = session();
        let catalog = catalog().await;

        let mut cart = manager(&session, &catalog).await;
        cart.add_product(A, 2).await.unwrap();
        cart.add_product(B, 1).await.unwrap();

        let reloaded = manager(&session, &catalog).await;
        assert_eq!(reloaded.cart(), cart.cart());

        cart.clear().await.unwrap();
        let reloaded = manager(&session, &catalog).await;
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_net_quantity_matches_add_remove_sequence() {
        let mut cart = manager(&session(), &catalog().await).await;
        let ops: [(bool, u32); 6] = [
            (true, 3),
            (false, 1),
            (true, 5),
            (false, 2),
            (true, 1),
            (false, 4),
        ];

        let mut expected: i64 = 0;
        for (add, qty) in ops {
            if add {
                cart.add_product(A, qty).await.unwrap();
                expected += i64::from(qty);
            } else {
                cart.remove_product(A, qty).await.unwrap();
                expected = (expected - i64::from(qty)).max(0);
            }
            let stored = cart.cart().quantity_of(A).map_or(0, i64::from);
            assert_eq!(stored, expected);
        }
    }
}
