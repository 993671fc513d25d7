//! Cart repository: the `cart_items` table.

use sqlx::PgPool;

use cornershop_core::{CartLineId, ProductId, Quantity, SessionId};

use super::RepositoryError;
use super::catalog::ProductRow;
use crate::models::Product;

/// `cart_items` row joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    line_id: CartLineId,
    line_quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

/// A persisted cart line as the store returns it.
///
/// The quantity is the raw column value; the cart synchronizer decides what
/// to do with rows that violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCartLine {
    pub id: CartLineId,
    pub product: Product,
    pub quantity: i32,
}

/// Repository for cart line operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every line for a session, oldest first, joined with its product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a joined product is invalid.
    pub async fn list_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id AS line_id, ci.quantity AS line_quantity,
                   p.id, p.name, p.description, p.price, p.image_url,
                   p.category_id, p.created_at
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.session_id = $1
            ORDER BY ci.created_at, ci.id
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(StoredCartLine {
                    id: r.line_id,
                    product: Product::try_from(r.product)?,
                    quantity: r.line_quantity,
                })
            })
            .collect()
    }

    /// Insert a new line and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// product that no longer exists).
    pub async fn insert(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartLineId, RepositoryError> {
        let id: CartLineId = sqlx::query_scalar(
            r"
            INSERT INTO cart_items (session_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(session_id)
        .bind(product_id)
        .bind(quantity.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_quantity(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items
            SET quantity = $1
            WHERE id = $2
            ",
        )
        .bind(quantity.as_i32())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a line by ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CartLineId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every line for a session, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_session(&self, session_id: &SessionId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
