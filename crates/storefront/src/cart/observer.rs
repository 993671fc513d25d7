//! Presentation callbacks.

use crate::models::CartSnapshot;

use super::CartOperation;

/// Receives cart changes and failures from a [`super::CartSynchronizer`].
///
/// Each successful mutation produces exactly one `cart_changed`; each
/// failed one produces exactly one `operation_failed` and no `cart_changed`.
pub trait CartObserver: Send {
    /// The cart changed; re-render from `snapshot`.
    fn cart_changed(&mut self, snapshot: &CartSnapshot);

    /// An operation failed; local state is as it was before the call.
    fn operation_failed(&mut self, operation: CartOperation, message: &str);
}

/// A reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartFailure {
    pub operation: CartOperation,
    pub message: String,
}

/// Observer that buffers notifications until the presentation layer drains
/// them after an operation returns.
#[derive(Debug, Default)]
pub struct BufferedObserver {
    pending: Option<CartSnapshot>,
    failures: Vec<CartFailure>,
    refreshes: u64,
}

impl BufferedObserver {
    /// Create an empty observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the most recent snapshot not yet rendered.
    pub const fn take_render(&mut self) -> Option<CartSnapshot> {
        self.pending.take()
    }

    /// Take every failure not yet shown.
    pub fn take_failures(&mut self) -> Vec<CartFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Total refreshes received over the observer's lifetime.
    #[must_use]
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl CartObserver for BufferedObserver {
    fn cart_changed(&mut self, snapshot: &CartSnapshot) {
        self.refreshes += 1;
        self.pending = Some(snapshot.clone());
    }

    fn operation_failed(&mut self, operation: CartOperation, message: &str) {
        self.failures.push(CartFailure {
            operation,
            message: message.to_owned(),
        });
    }
}
