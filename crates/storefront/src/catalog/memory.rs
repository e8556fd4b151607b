//! Process-local catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use boutique_core::{CategoryId, Price, ProductId};

use super::CatalogLookup;
use crate::db::RepositoryError;
use crate::models::{Category, Product};

/// A catalog held in memory.
///
/// Clones share the same underlying data, so a test can keep a handle and
/// remove or reprice products after a cart has been filled.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<Shelves>>,
}

#[derive(Debug, Default)]
struct Shelves {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a category.
    pub async fn insert_category(&self, category: Category) {
        self.inner
            .write()
            .await
            .categories
            .insert(category.id, category);
    }

    /// Add or replace a product.
    pub async fn insert_product(&self, product: Product) {
        self.inner.write().await.products.insert(product.id, product);
    }

    /// Remove a product, returning it if it existed.
    pub async fn remove_product(&self, id: ProductId) -> Option<Product> {
        self.inner.write().await.products.remove(&id)
    }

    /// Change a product's unit price. Returns `false` if the product is absent.
    pub async fn set_price(&self, id: ProductId, unit_price: Price) -> bool {
        match self.inner.write().await.products.get_mut(&id) {
            Some(product) => {
                product.unit_price = unit_price;
                true
            }
            None => false,
        }
    }
}

fn by_label(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
    products
}

impl CatalogLookup for InMemoryCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn find_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let shelves = self.inner.read().await;
        let products = shelves
            .products
            .values()
            .filter(|p| p.category_id == category)
            .cloned()
            .collect();
        Ok(by_label(products))
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let shelves = self.inner.read().await;
        let products = shelves
            .products
            .values()
            .filter(|p| p.matches(term))
            .cloned()
            .collect();
        Ok(by_label(products))
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> =
            self.inner.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, label: &str, category: i32) -> Product {
        Product {
            id: ProductId::new(id),
            label: label.to_string(),
            description: format!("{label} from the boutique"),
            unit_price: Price::from_cents(1000),
            category_id: CategoryId::new(category),
        }
    }

    async fn stocked() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert_category(Category {
                id: CategoryId::new(2),
                name: "Teas".to_string(),
            })
            .await;
        catalog
            .insert_category(Category {
                id: CategoryId::new(1),
                name: "Coffees".to_string(),
            })
            .await;
        catalog.insert_product(product(1, "Sencha", 2)).await;
        catalog.insert_product(product(2, "Assam", 2)).await;
        catalog.insert_product(product(3, "Moka", 1)).await;
        catalog
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let catalog = stocked().await;
        assert!(catalog.find_by_id(ProductId::new(99)).await.unwrap().is_none());
        assert_eq!(
            catalog.find_by_id(ProductId::new(3)).await.unwrap().unwrap().label,
            "Moka"
        );
    }

    #[tokio::test]
    async fn test_find_by_category_sorted_by_label() {
        let catalog = stocked().await;
        let teas = catalog.find_by_category(CategoryId::new(2)).await.unwrap();
        let labels: Vec<_> = teas.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Assam", "Sencha"]);
    }

    #[tokio::test]
    async fn test_search_matches_description() {
        let catalog = stocked().await;
        let found = catalog.search("boutique").await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(catalog.search("earl grey").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_sorted_by_name() {
        let catalog = stocked().await;
        let names: Vec<_> = catalog
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Coffees", "Teas"]);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let catalog = stocked().await;
        let handle = catalog.clone();
        handle.remove_product(ProductId::new(1)).await;
        assert!(catalog.find_by_id(ProductId::new(1)).await.unwrap().is_none());
        assert!(handle.set_price(ProductId::new(2), Price::from_cents(1)).await);
        assert!(!handle.set_price(ProductId::new(1), Price::from_cents(1)).await);
    }
}
