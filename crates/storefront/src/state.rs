//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::error;

use cornershop_core::SessionId;

use crate::cart::{CartRegistry, SharedCart};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::store::PgStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store, the catalog cache, and live carts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: PgStore,
    catalog: Cache<(), Arc<Catalog>>,
    carts: CartRegistry<PgStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_ttl)
            .build();
        let carts = CartRegistry::new(store.clone(), config.session_idle);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                carts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.store.pool()
    }

    /// The catalog, loaded from the store when the cached copy has expired.
    ///
    /// A failed load is logged and an empty catalog is served (and not
    /// cached).
    pub async fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.inner.catalog.get(&()).await {
            return catalog;
        }

        match Catalog::load(&self.inner.store).await {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                self.inner.catalog.insert((), Arc::clone(&catalog)).await;
                catalog
            }
            Err(e) => {
                error!(error = %e, "failed to load catalog");
                Arc::new(Catalog::default())
            }
        }
    }

    /// The live cart for a browser session.
    pub async fn cart(&self, session_id: &SessionId) -> SharedCart<PgStore> {
        self.inner.carts.cart(session_id).await
    }

    /// Drop a session's live cart; the next request loads it from the store.
    pub async fn evict_cart(&self, session_id: &SessionId) {
        self.inner.carts.evict(session_id).await;
    }
}
