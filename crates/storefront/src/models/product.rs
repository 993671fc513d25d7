//! Catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cornershop_core::{CategoryId, Price, ProductId};

/// A product offered in the storefront.
///
/// Read-only from the storefront's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Current unit price.
    pub price: Price,
    /// Image shown in the grid and the cart.
    pub image_url: String,
    /// Category this product belongs to, if any.
    pub category_id: Option<CategoryId>,
    /// When the product was created (catalog lists newest first).
    pub created_at: DateTime<Utc>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name, also used as the filter key in navigation.
    pub name: String,
}
