//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Coffee
//!     products:
//!       - name: House Blend
//!         description: Medium roast, 250 g
//!         price: "12.50"
//!         image_url: https://images.example.com/house-blend.jpg
//! products:            # uncategorized
//!   - name: Gift Card
//!     price: 25
//! ```
//!
//! Categories are matched by name. Products whose name already exists are
//! skipped, so the command can be re-run after editing the file.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use cornershop_core::{CategoryId, Price};
use cornershop_storefront::db::{CatalogRepository, create_pool};

use super::{CommandError, database_url};

/// Top level of a catalog file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    /// Products without a category.
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
}

impl CatalogSeed {
    fn product_count(&self) -> usize {
        self.products.len() + self.categories.iter().map(|c| c.products.len()).sum::<usize>()
    }
}

/// Check a catalog file, returning one message per problem.
#[must_use]
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut categories = HashSet::new();
    let mut products = HashSet::new();

    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push("category with empty name".to_string());
        } else if !categories.insert(category.name.as_str()) {
            errors.push(format!("duplicate category '{}'", category.name));
        }
    }

    let all_products = seed
        .products
        .iter()
        .chain(seed.categories.iter().flat_map(|c| c.products.iter()));
    for product in all_products {
        if product.name.trim().is_empty() {
            errors.push("product with empty name".to_string());
        } else if !products.insert(product.name.as_str()) {
            errors.push(format!("duplicate product '{}'", product.name));
        }
        if let Err(e) = Price::new(product.price) {
            errors.push(format!("product '{}': {e}", product.name));
        }
    }

    errors
}

/// Seed categories and products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;
    info!(
        categories = seed.categories.len(),
        products = seed.product_count(),
        "Parsed catalog"
    );

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Invalid(errors.len()));
    }

    let pool = create_pool(&database_url()?).await?;
    let repo = CatalogRepository::new(&pool);
    let mut existing: HashSet<String> = repo
        .list_products()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    let mut groups: Vec<(Option<CategoryId>, &[ProductSeed])> = vec![(None, seed.products.as_slice())];
    for category in &seed.categories {
        let stored = repo.upsert_category(&category.name).await?;
        groups.push((Some(stored.id), category.products.as_slice()));
    }

    for (category_id, products) in groups {
        for product in products {
            if !existing.insert(product.name.clone()) {
                skipped += 1;
                continue;
            }
            let price = Price::new(product.price).map_err(|_| CommandError::Invalid(1))?;
            repo.insert_product(
                &product.name,
                &product.description,
                price,
                &product.image_url,
                category_id,
            )
            .await?;
            inserted += 1;
        }
    }

    info!("Seeding complete!");
    info!("  Categories: {}", seed.categories.len());
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}
