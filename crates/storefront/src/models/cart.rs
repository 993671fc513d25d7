//! Cart domain types.

use serde::Serialize;

use cornershop_core::{CartLineId, Price, ProductId, Quantity};

use super::Product;

/// One product-quantity pairing persisted for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Store-assigned ID of the `cart_items` row.
    pub id: CartLineId,
    /// Product on this line.
    pub product: Product,
    /// Units of the product (always >= 1).
    pub quantity: Quantity,
}

impl CartLine {
    /// ID of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Immutable view of a cart handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Sum of every line total.
    pub total: Price,
    /// Sum of every line quantity (the cart badge).
    pub item_count: u32,
}

impl CartSnapshot {
    /// Build a snapshot from lines, computing totals from scratch.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.to_vec(),
            total: lines.iter().map(CartLine::line_total).sum(),
            item_count: lines.iter().map(|l| l.quantity.get()).sum(),
        }
    }

    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_lines(&[])
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
