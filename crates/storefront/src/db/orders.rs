//! Order repository: `orders` and `order_items`.
//!
//! Order rows and their line items are written by two separate statements,
//! not one transaction. A failure between them leaves an order with no lines.

use sqlx::{PgPool, Postgres, QueryBuilder};

use cornershop_core::OrderId;

use super::RepositoryError;
use crate::models::{NewOrder, NewOrderLine};

/// Repository for order writes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order row and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (session_id, customer_name, customer_email,
                                customer_address, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&order.session_id)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.address)
        .bind(order.total_amount.amount())
        .bind(order.status)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Bulk insert the line items of an order in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, price) ");
        builder.push_values(lines, |mut row, line| {
            row.push_bind(order_id)
                .push_bind(line.product_id)
                .push_bind(line.quantity.as_i32())
                .push_bind(line.price.amount());
        });

        builder.build().execute(self.pool).await?;
        Ok(())
    }
}
