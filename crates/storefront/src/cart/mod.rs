//! Cart synchronization.
//!
//! [`CartSynchronizer`] owns one browser session's cart. Every mutation is
//! sent to the store first; local state changes only after the store
//! confirms, and then the [`CartObserver`] is told to re-render exactly once.
//! A failed mutation leaves local state untouched and reports the failure to
//! the observer instead. Local state never leads remote state.
//!
//! ```text
//! absent -> pending-create -> persisted(n) -> persisted(n +/- 1)* -> removed
//! ```

mod observer;
mod registry;
mod sync;

use thiserror::Error;

use cornershop_core::{CartLineId, OrderId, ProductId};

use crate::store::StoreError;

pub use observer::{BufferedObserver, CartFailure, CartObserver};
pub use registry::{CartRegistry, SharedCart};
pub use sync::CartSynchronizer;

/// Cart operations, as reported to the observer on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    AddOne,
    SetQuantity,
    Remove,
    Checkout,
}

impl CartOperation {
    /// Stable name for logs and views.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddOne => "add_one",
            Self::SetQuantity => "set_quantity",
            Self::Remove => "remove",
            Self::Checkout => "checkout",
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from cart operations.
///
/// `UnknownProduct` and `UnknownLine` are local no-ops: the store was not
/// called and the observer was not notified.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not in the loaded catalog.
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    /// The cart line is not in the local cart.
    #[error("cart line {0} is not in the cart")]
    UnknownLine(CartLineId),

    /// The store no longer has the cart line (removed from another tab).
    #[error("cart line {0} no longer exists")]
    StaleLine(CartLineId),

    /// The store call failed.
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(#[from] StoreError),
}

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The order row could not be created. Nothing was persisted.
    #[error("failed to create order: {0}")]
    CreateFailed(#[source] StoreError),

    /// The order row exists but its line items were not saved.
    ///
    /// The order is not rolled back.
    #[error("order {order_id} was created but its line items were not saved: {source}")]
    ItemsFailed {
        order_id: OrderId,
        #[source]
        source: StoreError,
    },
}
