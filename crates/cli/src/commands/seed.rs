//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Teas
//!     products:
//!       - label: Sencha
//!         description: Steamed green tea
//!         unit_price: "12.50"
//! ```
//!
//! Each category is inserted with its products in one transaction. Categories
//! that already exist are skipped, so the command can be re-run.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use boutique_core::Price;
use boutique_storefront::db::{self, CatalogRepository, RepositoryError, catalog::NewProduct};

/// Catalog file contents.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

/// One category and its products.
#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One product.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: Price,
}

impl From<&ProductSeed> for NewProduct {
    fn from(seed: &ProductSeed) -> Self {
        Self {
            label: seed.label.trim().to_string(),
            description: seed.description.trim().to_string(),
            unit_price: seed.unit_price,
        }
    }
}

/// Check a catalog file for problems before touching the database.
fn validate(file: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for category in &file.categories {
        let name = category.name.trim();
        if name.is_empty() {
            errors.push("category with empty name".to_string());
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            errors.push(format!("duplicate category: {name}"));
        }
        for product in &category.products {
            if product.label.trim().is_empty() {
                errors.push(format!("{name}: product with empty label"));
            }
            if product.unit_price.amount().is_sign_negative() {
                errors.push(format!(
                    "{name}: {} has a negative price",
                    product.label.trim()
                ));
            }
        }
    }

    errors
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let file: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&file);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = CatalogRepository::new(&pool);
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for category in &file.categories {
        let products: Vec<NewProduct> = category.products.iter().map(NewProduct::from).collect();
        match repo
            .create_category_with_products(category.name.trim(), &products)
            .await
        {
            Ok((created, rows)) => {
                info!(category = %created.name, products = rows.len(), "Category seeded");
                inserted += 1;
            }
            Err(RepositoryError::Conflict(msg)) => {
                warn!("Skipping: {msg}");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Categories inserted: {inserted}");
    info!("  Categories skipped (already exist): {skipped}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> CatalogFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_catalog_file() {
        let file = parse(
            r#"
categories:
  - name: Teas
    products:
      - label: Sencha
        description: Steamed green tea
        unit_price: "12.50"
      - label: Genmaicha
        unit_price: "9.00"
  - name: Cups
"#,
        );

        assert_eq!(file.categories.len(), 2);
        assert_eq!(file.categories[0].products[0].unit_price, Price::from_cents(1250));
        assert!(file.categories[0].products[1].description.is_empty());
        assert!(file.categories[1].products.is_empty());
        assert!(validate(&file).is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let file = parse(
            r#"
categories:
  - name: Teas
    products:
      - label: " "
        unit_price: "1.00"
      - label: Refund
        unit_price: "-3.00"
  - name: teas
  - name: ""
"#,
        );

        let errors = validate(&file);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("duplicate category")));
        assert!(errors.iter().any(|e| e.contains("negative price")));
    }
}
