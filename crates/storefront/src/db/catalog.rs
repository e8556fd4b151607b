//! Catalog repository for database operations.

use sqlx::PgPool;

use boutique_core::{CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::catalog::CatalogLookup;
use crate::models::{Category, Product};

/// Repository for catalog reads (and seeding).
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    label: String,
    description: String,
    unit_price: Price,
    category_id: CategoryId,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            description: row.description,
            unit_price: row.unit_price,
            category_id: row.category_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
}

/// A product to insert while seeding the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub label: String,
    pub description: String,
    pub unit_price: Price,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category and its products in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_category_with_products(
        &self,
        name: &str,
        products: &[NewProduct],
    ) -> Result<(Category, Vec<Product>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO boutique.category (name)
            VALUES ($1)
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("category {name} already exists"));
            }
            RepositoryError::Database(e)
        })?;

        let category = Category {
            id: row.id,
            name: row.name,
        };

        let mut created = Vec::with_capacity(products.len());
        for product in products {
            let row = sqlx::query_as::<_, ProductRow>(
                r"
                INSERT INTO boutique.product (label, description, unit_price, category_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, label, description, unit_price, category_id
                ",
            )
            .bind(&product.label)
            .bind(&product.description)
            .bind(product.unit_price)
            .bind(category.id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(Product::from(row));
        }

        tx.commit().await?;

        Ok((category, created))
    }
}

/// Build an `ILIKE` pattern that matches `term` literally anywhere.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl CatalogLookup for CatalogRepository<'_> {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, label, description, unit_price, category_id
            FROM boutique.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn find_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, label, description, unit_price, category_id
            FROM boutique.product
            WHERE category_id = $1
            ORDER BY label, id
            ",
        )
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, label, description, unit_price, category_id
            FROM boutique.product
            WHERE label ILIKE $1 OR description ILIKE $1
            ORDER BY label, id
            ",
        )
        .bind(contains_pattern(term))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name
            FROM boutique.category
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: r.id,
                name: r.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("silk"), "%silk%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }
}
