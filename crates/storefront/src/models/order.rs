//! Order domain types.

use serde::{Deserialize, Serialize};

use cornershop_core::{OrderStatus, Price, ProductId, Quantity, SessionId};

use super::CartLine;

/// Customer details entered at checkout.
///
/// Stored as entered; the storefront does not validate them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// An order row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub session_id: SessionId,
    pub customer: CustomerDetails,
    pub total_amount: Price,
    pub status: OrderStatus,
}

/// An order line about to be inserted.
///
/// Copies the price at submission so later catalog changes never alter a
/// placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub price: Price,
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            quantity: line.quantity,
            price: line.product.price,
        }
    }
}
