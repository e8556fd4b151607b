//! Catalog domain types.

use serde::{Deserialize, Serialize};

use boutique_core::{CategoryId, Price, ProductId};

/// A catalog category (a shelf of the boutique).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product offered in the catalog.
///
/// Read-only from the cart's perspective: the cart only stores `id`, and looks
/// up `unit_price` every time a total is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub label: String,
    /// Free-text description, searched alongside the label.
    pub description: String,
    pub unit_price: Price,
    pub category_id: CategoryId,
}

impl Product {
    /// Whether `term` appears in the label or description (case-insensitive).
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.label.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}
