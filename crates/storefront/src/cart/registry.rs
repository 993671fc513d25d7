//! Live carts, one per browser session.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::warn;

use cornershop_core::SessionId;

use super::{BufferedObserver, CartError, CartSynchronizer};
use crate::store::CartStore;

/// A session's synchronizer behind an async lock.
///
/// Holding the lock for the whole operation serializes mutations from
/// concurrent requests (several tabs, double clicks) for one session.
pub type SharedCart<S> = Arc<Mutex<CartSynchronizer<S, BufferedObserver>>>;

/// Registry of hydrated carts.
///
/// A cart is loaded from the store on first access and evicted after it has
/// been idle for the configured time; the next access loads it again.
#[derive(Clone)]
pub struct CartRegistry<S> {
    store: S,
    carts: Cache<SessionId, SharedCart<S>>,
}

impl<S> CartRegistry<S>
where
    S: CartStore + Clone + 'static,
{
    /// Create a registry over a store.
    #[must_use]
    pub fn new(store: S, idle: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(idle)
            .build();
        Self { store, carts }
    }

    /// The session's cart, loading it on first access.
    ///
    /// If loading fails the cart is returned empty and is not kept, so the
    /// next request tries again.
    pub async fn cart(&self, session_id: &SessionId) -> SharedCart<S> {
        let store = self.store.clone();
        let id = session_id.clone();
        let loaded = self
            .carts
            .try_get_with(session_id.clone(), async move {
                let mut cart = CartSynchronizer::new(store, id, BufferedObserver::new());
                cart.load().await?;
                cart.observer_mut().take_render();
                Ok::<_, CartError>(Arc::new(Mutex::new(cart)))
            })
            .await;

        match loaded {
            Ok(cart) => cart,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "serving unloaded cart");
                Arc::new(Mutex::new(CartSynchronizer::new(
                    self.store.clone(),
                    session_id.clone(),
                    BufferedObserver::new(),
                )))
            }
        }
    }

    /// Drop a session's cart so the next access reloads it.
    pub async fn evict(&self, session_id: &SessionId) {
        self.carts.invalidate(session_id).await;
    }
}
