//! Remote store contract.
//!
//! The cart synchronizer never talks to a database directly. It is generic
//! over [`CartStore`] (and reads the catalog through [`CatalogStore`]) so the
//! same logic runs against `PostgreSQL` in production and against an
//! in-memory store in tests.
//!
//! # Operations
//!
//! | Method | Statement |
//! |--------|-----------|
//! | `fetch_cart` | `SELECT cart_items JOIN products WHERE session_id = ?` |
//! | `insert_line` | `INSERT INTO cart_items ... RETURNING id` |
//! | `update_quantity` | `UPDATE cart_items SET quantity = ? WHERE id = ?` |
//! | `delete_line` | `DELETE FROM cart_items WHERE id = ?` |
//! | `clear_session` | `DELETE FROM cart_items WHERE session_id = ?` |
//! | `insert_order` | `INSERT INTO orders ... RETURNING id` |
//! | `insert_order_lines` | bulk `INSERT INTO order_items` |

#[cfg(test)]
mod memory;
mod postgres;

use std::future::Future;

use thiserror::Error;

use cornershop_core::{CartLineId, OrderId, ProductId, Quantity, SessionId};

use crate::db::RepositoryError;
use crate::models::{Category, NewOrder, NewOrderLine, Product};

pub use crate::db::cart::StoredCartLine;
#[cfg(test)]
pub use memory::{MemoryStore, StoreOp, sample_product};
pub use postgres::PgStore;

/// Errors surfaced by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database failed.
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the store reported that the referenced row does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::NotFound))
    }
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(
                e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => Self::Unavailable(e.to_string()),
            other => Self::Repository(other),
        }
    }
}

/// Read access to the product catalog.
pub trait CatalogStore: Send + Sync {
    /// Every product, newest first.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    /// Every category, by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;
}

/// Persistence for session carts and orders.
pub trait CartStore: Send + Sync {
    /// Every cart line for a session joined with its product, oldest first.
    fn fetch_cart(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Vec<StoredCartLine>, StoreError>> + Send;

    /// Insert a line and return the store-assigned ID.
    fn insert_line(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartLineId, StoreError>> + Send;

    /// Overwrite the quantity of an existing line.
    ///
    /// Fails with a not-found error if the line is gone.
    fn update_quantity(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete one line. Deleting a line that is already gone succeeds.
    fn delete_line(&self, id: CartLineId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete every line for a session.
    fn clear_session(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert an order row and return its ID.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, StoreError>> + Send;

    /// Insert every line item for an order.
    fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
