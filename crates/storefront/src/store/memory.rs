//! In-memory store adapter for tests.
//!
//! Mirrors the `PostgreSQL` adapter's semantics (inner join on products,
//! not-found on updating a missing line, idempotent deletes) and adds
//! failure injection: any operation can be switched to fail with
//! [`StoreError::Unavailable`] until it is recovered.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use cornershop_core::{CartLineId, OrderId, ProductId, Quantity, SessionId};

use super::{CartStore, CatalogStore, StoreError, StoredCartLine};
use crate::db::RepositoryError;
use crate::models::{Category, NewOrder, NewOrderLine, Product};

/// Store operations, used for failure injection and call logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListProducts,
    ListCategories,
    FetchCart,
    InsertLine,
    UpdateQuantity,
    DeleteLine,
    ClearSession,
    InsertOrder,
    InsertOrderLines,
}

#[derive(Debug, Clone)]
struct CartRow {
    id: CartLineId,
    session_id: SessionId,
    product_id: ProductId,
    quantity: i32,
}

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    categories: Vec<Category>,
    cart_rows: Vec<CartRow>,
    orders: Vec<(OrderId, NewOrder)>,
    order_lines: Vec<(OrderId, NewOrderLine)>,
    failing: HashSet<StoreOp>,
    calls: Vec<StoreOp>,
}

/// Store held entirely in memory.
///
/// Clones share state, so a test can keep a handle for setup and
/// inspection while the synchronizer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with a catalog.
    #[must_use]
    pub fn with_catalog(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.products = products;
            state.categories = categories;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `op` fail until [`MemoryStore::recover`] is called.
    pub fn fail(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: StoreOp) {
        self.lock().failing.remove(&op);
    }

    /// Every operation invoked so far, in order (including failed ones).
    #[must_use]
    pub fn calls(&self) -> Vec<StoreOp> {
        self.lock().calls.clone()
    }

    /// Insert a cart row directly, bypassing any synchronizer.
    ///
    /// Simulates a write from another tab, or a corrupt row when `quantity`
    /// is not positive.
    pub fn insert_raw_line(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: i32,
    ) -> CartLineId {
        let id = CartLineId::generate();
        self.lock().cart_rows.push(CartRow {
            id,
            session_id: session_id.clone(),
            product_id,
            quantity,
        });
        id
    }

    /// Delete a cart row directly, bypassing any synchronizer.
    pub fn delete_raw_line(&self, id: CartLineId) {
        self.lock().cart_rows.retain(|r| r.id != id);
    }

    /// Persisted `(id, product, quantity)` rows for a session, oldest first.
    #[must_use]
    pub fn cart_rows(&self, session_id: &SessionId) -> Vec<(CartLineId, ProductId, i32)> {
        self.lock()
            .cart_rows
            .iter()
            .filter(|r| &r.session_id == session_id)
            .map(|r| (r.id, r.product_id, r.quantity))
            .collect()
    }

    /// Every persisted order.
    #[must_use]
    pub fn orders(&self) -> Vec<(OrderId, NewOrder)> {
        self.lock().orders.clone()
    }

    /// Persisted line items of one order.
    #[must_use]
    pub fn order_lines(&self, order_id: OrderId) -> Vec<NewOrderLine> {
        self.lock()
            .order_lines
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Replace the price of a catalog product.
    pub fn set_price(&self, product_id: ProductId, price: cornershop_core::Price) {
        let mut state = self.lock();
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
        }
    }

    /// Record the call and fail it if injection is active.
    fn enter(&self, op: StoreOp) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("injected failure: {op:?}")));
        }
        Ok(state)
    }
}

impl CatalogStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.enter(StoreOp::ListProducts)?;
        let mut products = state.products.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let state = self.enter(StoreOp::ListCategories)?;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

impl CartStore for MemoryStore {
    async fn fetch_cart(&self, session_id: &SessionId) -> Result<Vec<StoredCartLine>, StoreError> {
        let state = self.enter(StoreOp::FetchCart)?;
        Ok(state
            .cart_rows
            .iter()
            .filter(|r| &r.session_id == session_id)
            .filter_map(|r| {
                let product = state.products.iter().find(|p| p.id == r.product_id)?;
                Some(StoredCartLine {
                    id: r.id,
                    product: product.clone(),
                    quantity: r.quantity,
                })
            })
            .collect())
    }

    async fn insert_line(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartLineId, StoreError> {
        let mut state = self.enter(StoreOp::InsertLine)?;
        if !state.products.iter().any(|p| p.id == product_id) {
            return Err(RepositoryError::NotFound.into());
        }
        let id = CartLineId::generate();
        state.cart_rows.push(CartRow {
            id,
            session_id: session_id.clone(),
            product_id,
            quantity: quantity.as_i32(),
        });
        Ok(id)
    }

    async fn update_quantity(&self, id: CartLineId, quantity: Quantity) -> Result<(), StoreError> {
        let mut state = self.enter(StoreOp::UpdateQuantity)?;
        let row = state
            .cart_rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.quantity = quantity.as_i32();
        Ok(())
    }

    async fn delete_line(&self, id: CartLineId) -> Result<(), StoreError> {
        let mut state = self.enter(StoreOp::DeleteLine)?;
        state.cart_rows.retain(|r| r.id != id);
        Ok(())
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.enter(StoreOp::ClearSession)?;
        state.cart_rows.retain(|r| &r.session_id != session_id);
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        let mut state = self.enter(StoreOp::InsertOrder)?;
        let id = OrderId::generate();
        state.orders.push((id, order.clone()));
        Ok(id)
    }

    async fn insert_order_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), StoreError> {
        let mut state = self.enter(StoreOp::InsertOrderLines)?;
        state
            .order_lines
            .extend(lines.iter().map(|line| (order_id, line.clone())));
        Ok(())
    }
}

/// Build a catalog product for tests and demos.
#[must_use]
pub fn sample_product(name: &str, price: &str) -> Product {
    Product {
        id: ProductId::generate(),
        name: name.to_owned(),
        description: format!("{name} description"),
        price: cornershop_core::Price::parse(price).unwrap_or_default(),
        image_url: format!("/static/img/{}.jpg", name.to_lowercase()),
        category_id: None,
        created_at: Utc::now(),
    }
}
