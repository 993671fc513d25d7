//! Read-only product catalog.
//!
//! The catalog is loaded from the store as a whole and shared between
//! sessions. Category names are resolved through an explicit lookup; a
//! product without a (known) category is shown as `Uncategorized`.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::instrument;

use cornershop_core::{CategoryId, ProductId};

use crate::models::{Category, Product};
use crate::store::{CatalogStore, StoreError};

/// Display name for products without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Products and categories as loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    category_names: HashMap<CategoryId, String>,
}

impl Catalog {
    /// Build a catalog from already loaded products and categories.
    #[must_use]
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let category_names = categories
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect();
        Self {
            products,
            categories,
            category_names,
        }
    }

    /// Load the full catalog from a store.
    ///
    /// # Errors
    ///
    /// Returns the store error if either listing fails.
    #[instrument(skip(store))]
    pub async fn load<S: CatalogStore>(store: &S) -> Result<Self, StoreError> {
        let products = store.list_products().await?;
        let categories = store.list_categories().await?;
        tracing::debug!(
            products = products.len(),
            categories = categories.len(),
            "catalog loaded"
        );
        Ok(Self::new(products, categories))
    }

    /// Every product, newest first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Every category, by name.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Category name of a product, or [`UNCATEGORIZED`].
    #[must_use]
    pub fn category_name(&self, product: &Product) -> &str {
        product
            .category_id
            .and_then(|id| self.category_names.get(&id))
            .map_or(UNCATEGORIZED, String::as_str)
    }

    /// Products matching a navigation filter, in catalog order.
    #[must_use]
    pub fn filter(&self, filter: &CategoryFilter) -> Vec<&Product> {
        match filter {
            CategoryFilter::All => self.products.iter().collect(),
            CategoryFilter::Named(name) => self
                .products
                .iter()
                .filter(|p| {
                    p.category_id
                        .and_then(|id| self.category_names.get(&id))
                        .is_some_and(|n| n == name)
                })
                .collect(),
        }
    }
}

/// Category navigation filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products whose category has this exact name.
    Named(String),
}

impl CategoryFilter {
    /// The navigation key (`"all"` or the category name).
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Named(s.to_owned()))
        }
    }
}
