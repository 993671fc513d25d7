//! Catalog repository: products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cornershop_core::{CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Category, Product};

/// `products` row as stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            image_url: row.image_url,
            category_id: row.category_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
}

/// Repository for catalog reads and catalog seeding.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is negative.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, category_id, created_at
            FROM products
            ORDER BY created_at DESC, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List every category by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name
            FROM categories
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

    /// Insert a category, or return the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(Category {
            id: row.id,
            name: row.name,
        })
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_product(
        &self,
        name: &str,
        description: &str,
        price: Price,
        image_url: &str,
        category_id: Option<CategoryId>,
    ) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (name, description, price, image_url, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .bind(price.amount())
        .bind(image_url)
        .bind(category_id)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}
