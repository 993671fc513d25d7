//! The per-session cart synchronizer.

use std::collections::HashSet;

use tracing::{debug, error, info, instrument, warn};

use cornershop_core::{CartLineId, OrderId, OrderStatus, ProductId, Quantity, SessionId};

use super::{CartError, CartObserver, CartOperation, OrderError};
use crate::catalog::Catalog;
use crate::models::{CartLine, CartSnapshot, CustomerDetails, NewOrder, NewOrderLine};
use crate::store::{CartStore, StoreError, StoredCartLine};

/// Keeps one session's local cart consistent with the store.
///
/// Operations take `&mut self`, so a synchronizer serializes its own
/// mutations: one store round-trip completes (and local state is updated)
/// before the next one starts.
pub struct CartSynchronizer<S, O> {
    store: S,
    session_id: SessionId,
    observer: O,
    lines: Vec<CartLine>,
}

impl<S, O> std::fmt::Debug for CartSynchronizer<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("session_id", &self.session_id)
            .field("lines", &self.lines.len())
            .finish_non_exhaustive()
    }
}

impl<S: CartStore, O: CartObserver> CartSynchronizer<S, O> {
    /// Create a synchronizer with an empty local cart. Call
    /// [`CartSynchronizer::load`] to hydrate it.
    pub const fn new(store: S, session_id: SessionId, observer: O) -> Self {
        Self {
            store,
            session_id,
            observer,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Local cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a local line.
    #[must_use]
    pub fn line(&self, id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Current cart with totals recomputed from the lines.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_lines(&self.lines)
    }

    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    pub const fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Replace the local cart with the store's rows for this session.
    ///
    /// Rows with a non-positive quantity are skipped. When the store holds
    /// more than one row for a product, the oldest one wins.
    ///
    /// On failure local state is left as it was and the observer is not
    /// told; the cart simply stays as it was.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::RemoteUnavailable`] if the store call fails.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn load(&mut self) -> Result<(), CartError> {
        let rows = match self.store.fetch_cart(&self.session_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "failed to load cart");
                return Err(CartError::RemoteUnavailable(e));
            }
        };

        self.lines = reconcile(rows);
        debug!(lines = self.lines.len(), "cart loaded");
        self.notify_changed();
        Ok(())
    }

    /// Add one unit of a product, creating its line if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] (without calling the store) if
    /// the product is not in `catalog`, or a store failure.
    #[instrument(skip(self, catalog), fields(session_id = %self.session_id))]
    pub async fn add_one(&mut self, catalog: &Catalog, product_id: ProductId) -> Result<(), CartError> {
        let Some(product) = catalog.product(product_id) else {
            debug!("product not in catalog");
            return Err(CartError::UnknownProduct(product_id));
        };

        let existing = self
            .lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .map(|l| (l.id, l.quantity.increment()));

        if let Some((id, quantity)) = existing {
            if let Err(e) = self.store.update_quantity(id, quantity).await {
                return Err(self.fail(CartOperation::AddOne, e, Some(id)));
            }
            self.set_local_quantity(id, quantity);
        } else {
            match self
                .store
                .insert_line(&self.session_id, product_id, Quantity::ONE)
                .await
            {
                Ok(id) => self.lines.push(CartLine {
                    id,
                    product: product.clone(),
                    quantity: Quantity::ONE,
                }),
                Err(e) => return Err(self.fail(CartOperation::AddOne, e, None)),
            }
        }

        self.notify_changed();
        Ok(())
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] (without calling the store) if the
    /// line is not in the local cart, [`CartError::StaleLine`] if the store
    /// no longer has it, or a store failure.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn set_quantity(&mut self, id: CartLineId, quantity: i64) -> Result<(), CartError> {
        if self.line(id).is_none() {
            return Err(CartError::UnknownLine(id));
        }

        let Some(quantity) = clamp_quantity(quantity) else {
            debug!("non-positive quantity, removing line");
            return self.remove(id).await;
        };

        if let Err(e) = self.store.update_quantity(id, quantity).await {
            return Err(self.fail(CartOperation::SetQuantity, e, Some(id)));
        }

        self.set_local_quantity(id, quantity);
        self.notify_changed();
        Ok(())
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::set_quantity`].
    pub async fn increase(&mut self, id: CartLineId) -> Result<(), CartError> {
        let quantity = self.current_quantity(id)?.increment();
        self.set_quantity(id, i64::from(quantity.get())).await
    }

    /// Remove one unit from a line, removing the line at zero.
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::set_quantity`].
    pub async fn decrease(&mut self, id: CartLineId) -> Result<(), CartError> {
        match self.current_quantity(id)?.decrement() {
            Some(quantity) => self.set_quantity(id, i64::from(quantity.get())).await,
            None => self.remove(id).await,
        }
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] (without calling the store) if the
    /// line is not in the local cart, or a store failure.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn remove(&mut self, id: CartLineId) -> Result<(), CartError> {
        if self.line(id).is_none() {
            return Err(CartError::UnknownLine(id));
        }

        if let Err(e) = self.store.delete_line(id).await {
            return Err(self.fail(CartOperation::Remove, e, Some(id)));
        }

        self.lines.retain(|l| l.id != id);
        self.notify_changed();
        Ok(())
    }

    /// Turn the cart into an order.
    ///
    /// Inserts the order row, then its line items (prices copied from the
    /// cart), then clears the session's rows in the store. The local cart is
    /// cleared once the items are saved, even if clearing the store fails;
    /// leftover rows come back on the next load.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`] if there is nothing to order; the store
    ///   is not called.
    /// - [`OrderError::CreateFailed`] if the order row could not be created.
    /// - [`OrderError::ItemsFailed`] if the order row was created but its
    ///   items were not; the order row remains and the cart is unchanged.
    #[instrument(skip(self, customer), fields(session_id = %self.session_id))]
    pub async fn checkout(&mut self, customer: CustomerDetails) -> Result<OrderId, OrderError> {
        if self.lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let snapshot = self.snapshot();
        let order = NewOrder {
            session_id: self.session_id.clone(),
            customer,
            total_amount: snapshot.total,
            status: OrderStatus::Pending,
        };

        let order_id = match self.store.insert_order(&order).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "failed to create order");
                self.observer
                    .operation_failed(CartOperation::Checkout, "Could not place the order");
                return Err(OrderError::CreateFailed(e));
            }
        };

        let items: Vec<NewOrderLine> = self.lines.iter().map(NewOrderLine::from).collect();
        if let Err(e) = self.store.insert_order_lines(order_id, &items).await {
            error!(
                order_id = %order_id,
                error = %e,
                "order created without line items"
            );
            self.observer
                .operation_failed(CartOperation::Checkout, "Could not save the order items");
            return Err(OrderError::ItemsFailed {
                order_id,
                source: e,
            });
        }

        if let Err(e) = self.store.clear_session(&self.session_id).await {
            warn!(
                order_id = %order_id,
                error = %e,
                "failed to clear cart after order"
            );
        }

        self.lines.clear();
        info!(
            order_id = %order_id,
            total = %snapshot.total,
            items = snapshot.item_count,
            "order placed"
        );
        self.notify_changed();
        Ok(order_id)
    }

    fn current_quantity(&self, id: CartLineId) -> Result<Quantity, CartError> {
        self.line(id)
            .map(|l| l.quantity)
            .ok_or(CartError::UnknownLine(id))
    }

    fn set_local_quantity(&mut self, id: CartLineId, quantity: Quantity) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity;
        }
    }

    fn notify_changed(&mut self) {
        let snapshot = self.snapshot();
        self.observer.cart_changed(&snapshot);
    }

    /// Log a failed mutation, tell the observer, and classify the error.
    fn fail(&mut self, operation: CartOperation, err: StoreError, line: Option<CartLineId>) -> CartError {
        error!(%operation, error = %err, "cart operation failed");
        let err = match line {
            Some(id) if err.is_not_found() => CartError::StaleLine(id),
            _ => CartError::RemoteUnavailable(err),
        };
        let message = match operation {
            CartOperation::AddOne => "Could not add the item to your cart",
            CartOperation::SetQuantity => "Could not update the quantity",
            CartOperation::Remove => "Could not remove the item",
            CartOperation::Checkout => "Could not update your cart",
        };
        self.observer.operation_failed(operation, message);
        err
    }
}

/// Requests above [`Quantity::MAX`] are capped to it.
fn clamp_quantity(quantity: i64) -> Option<Quantity> {
    let capped = quantity.min(i64::from(Quantity::MAX.get()));
    u32::try_from(capped).ok().and_then(Quantity::new)
}

/// Turn stored rows into valid local lines.
fn reconcile(rows: Vec<StoredCartLine>) -> Vec<CartLine> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter_map(|row| {
            let Some(quantity) = Quantity::from_i32(row.quantity) else {
                warn!(
                    cart_id = %row.id,
                    quantity = row.quantity,
                    "skipping cart line with non-positive quantity"
                );
                return None;
            };
            if !seen.insert(row.product.id) {
                warn!(
                    cart_id = %row.id,
                    product_id = %row.product.id,
                    "skipping duplicate cart line for product"
                );
                return None;
            }
            Some(CartLine {
                id: row.id,
                product: row.product,
                quantity,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use cornershop_core::Price;

    use super::*;
    use crate::cart::BufferedObserver;
    use crate::models::Product;
    use crate::store::{MemoryStore, StoreOp, sample_product};

    struct Fixture {
        store: MemoryStore,
        catalog: Catalog,
        coffee: Product,
        tea: Product,
        sync: CartSynchronizer<MemoryStore, BufferedObserver>,
    }

    impl Fixture {
        fn session(&self) -> SessionId {
            self.sync.session_id().clone()
        }

        fn failures(&mut self) -> Vec<crate::cart::CartFailure> {
            self.sync.observer_mut().take_failures()
        }

        fn refreshes(&self) -> u64 {
            self.sync.observer().refreshes()
        }
    }

    fn fixture() -> Fixture {
        let coffee = sample_product("Coffee", "9.99");
        let tea = sample_product("Tea", "4.50");
        let store = MemoryStore::with_catalog(vec![coffee.clone(), tea.clone()], vec![]);
        let catalog = Catalog::new(vec![coffee.clone(), tea.clone()], vec![]);
        let sync = CartSynchronizer::new(
            store.clone(),
            SessionId::new("session_1_test"),
            BufferedObserver::new(),
        );
        Fixture {
            store,
            catalog,
            coffee,
            tea,
            sync,
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            address: "1 Main St".to_owned(),
        }
    }

    fn assert_invariants(sync: &CartSynchronizer<MemoryStore, BufferedObserver>) {
        let mut products = HashSet::new();
        for line in sync.lines() {
            assert!(line.quantity.get() >= 1);
            assert!(products.insert(line.product_id()), "duplicate product line");
        }
        let expected: Price = sync.lines().iter().map(CartLine::line_total).sum();
        assert_eq!(sync.snapshot().total, expected);
    }

    #[tokio::test]
    async fn test_add_to_empty_cart_creates_line() {
        let mut f = fixture();
        let coffee = f.coffee.id;

        f.sync.add_one(&f.catalog, coffee).await.unwrap();

        let lines = f.sync.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id(), coffee);
        assert_eq!(lines[0].quantity, Quantity::ONE);
        assert_eq!(f.store.cart_rows(&f.session()), vec![(lines[0].id, coffee, 1)]);
        assert_eq!(f.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        let id = f.sync.lines()[0].id;

        f.sync.add_one(&f.catalog, coffee).await.unwrap();

        assert_eq!(f.sync.lines().len(), 1);
        assert_eq!(f.sync.lines()[0].id, id);
        assert_eq!(f.sync.lines()[0].quantity.get(), 2);
        assert_eq!(f.store.cart_rows(&f.session()), vec![(id, coffee, 2)]);
        assert_eq!(f.refreshes(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_noop() {
        let mut f = fixture();
        let stranger = ProductId::generate();

        let result = f.sync.add_one(&f.catalog, stranger).await;

        assert!(matches!(result, Err(CartError::UnknownProduct(id)) if id == stranger));
        assert!(f.store.calls().is_empty());
        assert_eq!(f.refreshes(), 0);
        assert!(f.failures().is_empty());
    }

    #[tokio::test]
    async fn test_add_failure_leaves_cart_unchanged() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.store.fail(StoreOp::InsertLine);

        let result = f.sync.add_one(&f.catalog, coffee).await;

        assert!(matches!(result, Err(CartError::RemoteUnavailable(_))));
        assert!(f.sync.lines().is_empty());
        assert!(f.store.cart_rows(&f.session()).is_empty());
        assert_eq!(f.refreshes(), 0);
        let failures = f.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].operation, CartOperation::AddOne);
    }

    #[tokio::test]
    async fn test_add_failure_on_existing_line_keeps_quantity() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        let before = f.sync.lines().to_vec();
        f.store.fail(StoreOp::UpdateQuantity);

        assert!(f.sync.add_one(&f.catalog, coffee).await.is_err());

        assert_eq!(f.sync.lines(), before.as_slice());
        assert_eq!(f.store.cart_rows(&f.session())[0].2, 1);
        assert_eq!(f.refreshes(), 1);
    }

    #[tokio::test]
    async fn test_decrease_to_one() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        let id = f.sync.lines()[0].id;

        f.sync.decrease(id).await.unwrap();

        assert_eq!(f.sync.lines()[0].quantity, Quantity::ONE);
        assert_eq!(f.store.cart_rows(&f.session()), vec![(id, coffee, 1)]);
    }

    #[tokio::test]
    async fn test_decrease_from_one_removes_line() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        let id = f.sync.lines()[0].id;
        let refreshes = f.refreshes();

        f.sync.decrease(id).await.unwrap();

        assert!(f.sync.lines().is_empty());
        assert!(f.store.cart_rows(&f.session()).is_empty());
        assert_eq!(f.refreshes(), refreshes + 1);
        let calls = f.store.calls();
        assert_eq!(calls.last(), Some(&StoreOp::DeleteLine));
        assert!(!calls.contains(&StoreOp::UpdateQuantity));
    }

    #[tokio::test]
    async fn test_set_non_positive_quantity_removes_line() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        f.sync.add_one(&f.catalog, f.tea.id).await.unwrap();
        let coffee_line = f.sync.lines()[0].id;
        let tea_line = f.sync.lines()[1].id;

        f.sync.set_quantity(coffee_line, 0).await.unwrap();
        f.sync.set_quantity(tea_line, -3).await.unwrap();

        assert!(f.sync.lines().is_empty());
        assert!(f.store.cart_rows(&f.session()).is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_overwrites() {
        let mut f = fixture();
        let tea = f.tea.id;
        f.sync.add_one(&f.catalog, tea).await.unwrap();
        let id = f.sync.lines()[0].id;

        f.sync.set_quantity(id, 5).await.unwrap();

        assert_eq!(f.sync.lines()[0].quantity.get(), 5);
        assert_eq!(f.sync.snapshot().total, Price::parse("22.50").unwrap());
        assert_eq!(f.sync.snapshot().item_count, 5);
        assert_eq!(f.store.cart_rows(&f.session()), vec![(id, tea, 5)]);
    }

    #[tokio::test]
    async fn test_unknown_line_is_noop() {
        let mut f = fixture();
        let stranger = CartLineId::generate();

        assert!(matches!(
            f.sync.set_quantity(stranger, 3).await,
            Err(CartError::UnknownLine(_))
        ));
        assert!(matches!(
            f.sync.increase(stranger).await,
            Err(CartError::UnknownLine(_))
        ));
        assert!(matches!(
            f.sync.remove(stranger).await,
            Err(CartError::UnknownLine(_))
        ));
        assert!(f.store.calls().is_empty());
        assert_eq!(f.refreshes(), 0);
        assert!(f.failures().is_empty());
    }

    #[tokio::test]
    async fn test_increase_failure_leaves_cart_identical() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        let id = f.sync.lines()[0].id;
        let before = f.sync.snapshot();
        let refreshes = f.refreshes();
        f.store.fail(StoreOp::UpdateQuantity);

        assert!(f.sync.increase(id).await.is_err());

        assert_eq!(f.sync.snapshot(), before);
        assert_eq!(f.refreshes(), refreshes);
        let failures = f.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].operation, CartOperation::SetQuantity);
    }

    #[tokio::test]
    async fn test_remove_failure_leaves_cart_identical() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        let id = f.sync.lines()[0].id;
        let before = f.sync.snapshot();
        f.store.fail(StoreOp::DeleteLine);

        assert!(f.sync.remove(id).await.is_err());
        assert!(f.sync.decrease(id).await.is_err());

        assert_eq!(f.sync.snapshot(), before);
        assert_eq!(f.store.cart_rows(&f.session()).len(), 1);
        let failures = f.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.operation == CartOperation::Remove));
    }

    #[tokio::test]
    async fn test_line_removed_elsewhere_is_stale() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        let id = f.sync.lines()[0].id;
        f.store.delete_raw_line(id);

        let result = f.sync.increase(id).await;

        assert!(matches!(result, Err(CartError::StaleLine(stale)) if stale == id));
        assert_eq!(f.sync.lines()[0].quantity, Quantity::ONE);
        assert_eq!(f.failures().len(), 1);

        // Removing a line the store no longer has still succeeds.
        f.sync.remove(id).await.unwrap();
        assert!(f.sync.lines().is_empty());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let mut f = fixture();
        let session = f.session();
        f.store.insert_raw_line(&session, f.coffee.id, 2);
        f.store.insert_raw_line(&session, f.tea.id, 1);

        f.sync.load().await.unwrap();
        let first = f.sync.snapshot();
        f.sync.load().await.unwrap();

        assert_eq!(f.sync.snapshot(), first);
        assert_eq!(first.item_count, 3);
        assert_eq!(first.total, Price::parse("24.48").unwrap());
        assert_eq!(first.lines[0].product_id(), f.coffee.id);
        assert_eq!(f.refreshes(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_empty_cart_silently() {
        let mut f = fixture();
        f.store.insert_raw_line(&f.session(), f.coffee.id, 1);
        f.store.fail(StoreOp::FetchCart);

        assert!(matches!(
            f.sync.load().await,
            Err(CartError::RemoteUnavailable(_))
        ));

        assert!(f.sync.lines().is_empty());
        assert_eq!(f.refreshes(), 0);
        assert!(f.failures().is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_invalid_and_duplicate_rows() {
        let mut f = fixture();
        let session = f.session();
        let first = f.store.insert_raw_line(&session, f.coffee.id, 1);
        f.store.insert_raw_line(&session, f.coffee.id, 4);
        f.store.insert_raw_line(&session, f.tea.id, 0);
        f.store.insert_raw_line(&session, f.tea.id, -2);

        f.sync.load().await.unwrap();

        assert_eq!(f.sync.lines().len(), 1);
        assert_eq!(f.sync.lines()[0].id, first);
        assert_invariants(&f.sync);
    }

    #[tokio::test]
    async fn test_load_only_sees_own_session() {
        let mut f = fixture();
        f.store
            .insert_raw_line(&SessionId::new("session_2_other"), f.coffee.id, 3);

        f.sync.load().await.unwrap();

        assert!(f.sync.lines().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_clears_cart() {
        let mut f = fixture();
        let coffee = f.coffee.id;
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        f.sync.add_one(&f.catalog, coffee).await.unwrap();
        let refreshes = f.refreshes();

        let order_id = f.sync.checkout(customer()).await.unwrap();

        let orders = f.store.orders();
        assert_eq!(orders.len(), 1);
        let (id, order) = &orders[0];
        assert_eq!(*id, order_id);
        assert_eq!(order.total_amount, Price::parse("19.98").unwrap());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer, customer());
        assert_eq!(order.session_id, f.session());

        let items = f.store.order_lines(order_id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, coffee);
        assert_eq!(items[0].quantity.get(), 2);
        assert_eq!(items[0].price, Price::parse("9.99").unwrap());

        assert!(f.sync.lines().is_empty());
        assert!(f.store.cart_rows(&f.session()).is_empty());
        assert_eq!(f.refreshes(), refreshes + 1);
        assert_eq!(f.sync.observer_mut().take_render(), Some(CartSnapshot::empty()));
    }

    #[tokio::test]
    async fn test_checkout_freezes_prices() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.tea.id).await.unwrap();

        let order_id = f.sync.checkout(customer()).await.unwrap();
        f.store.set_price(f.tea.id, Price::parse("99.00").unwrap());

        assert_eq!(
            f.store.order_lines(order_id)[0].price,
            Price::parse("4.50").unwrap()
        );
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let mut f = fixture();

        assert!(matches!(
            f.sync.checkout(customer()).await,
            Err(OrderError::EmptyCart)
        ));
        assert!(f.store.calls().is_empty());
        assert!(f.store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_create_failure() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        let before = f.sync.snapshot();
        f.store.fail(StoreOp::InsertOrder);

        assert!(matches!(
            f.sync.checkout(customer()).await,
            Err(OrderError::CreateFailed(_))
        ));

        assert_eq!(f.sync.snapshot(), before);
        assert!(!f.store.calls().contains(&StoreOp::InsertOrderLines));
        assert_eq!(f.failures()[0].operation, CartOperation::Checkout);
    }

    #[tokio::test]
    async fn test_checkout_items_failure_leaves_order_without_items() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        let before = f.sync.snapshot();
        let refreshes = f.refreshes();
        f.store.fail(StoreOp::InsertOrderLines);

        let result = f.sync.checkout(customer()).await;

        let Err(OrderError::ItemsFailed { order_id, .. }) = result else {
            panic!("expected ItemsFailed, got {result:?}");
        };
        assert_eq!(f.store.orders().len(), 1);
        assert!(f.store.order_lines(order_id).is_empty());
        assert_eq!(f.sync.snapshot(), before);
        assert_eq!(f.store.cart_rows(&f.session()).len(), 1);
        assert!(!f.store.calls().contains(&StoreOp::ClearSession));
        assert_eq!(f.refreshes(), refreshes);
        assert_eq!(f.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_clear_failure_still_succeeds() {
        let mut f = fixture();
        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        f.store.fail(StoreOp::ClearSession);

        f.sync.checkout(customer()).await.unwrap();

        assert!(f.sync.lines().is_empty());
        assert_eq!(f.store.cart_rows(&f.session()).len(), 1);
        assert!(f.failures().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_clears_duplicate_rows() {
        let mut f = fixture();
        let session = f.session();
        f.store.insert_raw_line(&session, f.coffee.id, 1);
        f.store.insert_raw_line(&session, f.coffee.id, 1);
        f.sync.load().await.unwrap();

        f.sync.checkout(customer()).await.unwrap();

        assert!(f.store.cart_rows(&session).is_empty());
    }

    #[tokio::test]
    async fn test_random_operations_keep_invariants() {
        let mut f = fixture();
        let products = [f.coffee.id, f.tea.id];
        let ops = [
            StoreOp::InsertLine,
            StoreOp::UpdateQuantity,
            StoreOp::DeleteLine,
        ];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            for op in ops {
                if rng.random_bool(0.2) {
                    f.store.fail(op);
                } else {
                    f.store.recover(op);
                }
            }

            let before = f.sync.snapshot();
            let refreshes = f.refreshes();
            let line = f
                .sync
                .lines()
                .get(rng.random_range(0..3))
                .map(|l| l.id);
            let result = match (rng.random_range(0..5), line) {
                (0, _) | (_, None) => {
                    let product = products[rng.random_range(0..products.len())];
                    f.sync.add_one(&f.catalog, product).await
                }
                (1, Some(id)) => f.sync.increase(id).await,
                (2, Some(id)) => f.sync.decrease(id).await,
                (3, Some(id)) => f.sync.remove(id).await,
                (_, Some(id)) => f.sync.set_quantity(id, rng.random_range(-1..4)).await,
            };

            assert_invariants(&f.sync);
            if result.is_ok() {
                assert_eq!(f.refreshes(), refreshes + 1);
            } else {
                assert_eq!(f.sync.snapshot(), before);
                assert_eq!(f.refreshes(), refreshes);
                assert_eq!(f.failures().len(), 1);
            }

            let remote: Vec<_> = f
                .store
                .cart_rows(&f.session())
                .into_iter()
                .map(|(id, _, q)| (id, q))
                .collect();
            let local: Vec<_> = f
                .sync
                .lines()
                .iter()
                .map(|l| (l.id, l.quantity.as_i32()))
                .collect();
            assert_eq!(local, remote);
        }
    }

    #[tokio::test]
    async fn test_add_at_column_max_keeps_store_and_cart_equal() {
        let mut f = fixture();
        let session = f.session();
        let id = f.store.insert_raw_line(&session, f.coffee.id, i32::MAX);
        f.sync.load().await.unwrap();

        f.sync.add_one(&f.catalog, f.coffee.id).await.unwrap();
        f.sync.increase(id).await.unwrap();

        assert_eq!(f.sync.line(id).unwrap().quantity, Quantity::MAX);
        assert_eq!(f.store.cart_rows(&session), vec![(id, f.coffee.id, i32::MAX)]);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0), None);
        assert_eq!(clamp_quantity(-1), None);
        assert_eq!(clamp_quantity(3).map(|q| q.get()), Some(3));
        assert_eq!(
            clamp_quantity(i64::MAX).map(|q| q.as_i32()),
            Some(i32::MAX)
        );
    }
}
