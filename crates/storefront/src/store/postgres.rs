//! `PostgreSQL` store adapter.

use sqlx::PgPool;
use tracing::debug;

use cornershop_core::{CartLineId, OrderId, ProductId, Quantity, SessionId};

use super::{CartStore, CatalogStore, StoreError, StoredCartLine};
use crate::db::{CartRepository, CatalogRepository, OrderRepository};
use crate::models::{Category, NewOrder, NewOrderLine, Product};

/// Store backed by the storefront database.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CatalogStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(CatalogRepository::new(&self.pool).list_products().await?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(CatalogRepository::new(&self.pool).list_categories().await?)
    }
}

impl CartStore for PgStore {
    async fn fetch_cart(&self, session_id: &SessionId) -> Result<Vec<StoredCartLine>, StoreError> {
        Ok(CartRepository::new(&self.pool)
            .list_for_session(session_id)
            .await?)
    }

    async fn insert_line(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartLineId, StoreError> {
        Ok(CartRepository::new(&self.pool)
            .insert(session_id, product_id, quantity)
            .await?)
    }

    async fn update_quantity(&self, id: CartLineId, quantity: Quantity) -> Result<(), StoreError> {
        Ok(CartRepository::new(&self.pool)
            .update_quantity(id, quantity)
            .await?)
    }

    async fn delete_line(&self, id: CartLineId) -> Result<(), StoreError> {
        let deleted = CartRepository::new(&self.pool).delete(id).await?;
        if !deleted {
            debug!(cart_id = %id, "cart line already absent");
        }
        Ok(())
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let removed = CartRepository::new(&self.pool)
            .delete_for_session(session_id)
            .await?;
        debug!(session_id = %session_id, removed, "cleared session cart");
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        Ok(OrderRepository::new(&self.pool).insert(order).await?)
    }

    async fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), StoreError> {
        Ok(OrderRepository::new(&self.pool)
            .insert_lines(order_id, lines)
            .await?)
    }
}
