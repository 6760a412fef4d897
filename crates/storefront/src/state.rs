//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::{BackendClient, BackendError, StoreBackend};
use crate::checkout::{LookupDebouncer, RememberedCustomers};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The backend is held behind the
/// [`StoreBackend`] port so tests can inject a fake.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    backend: Arc<dyn StoreBackend>,
    debouncer: LookupDebouncer,
    remembered: RememberedCustomers,
}

impl AppState {
    /// Create the production state with the HTTP backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self::with_backend(config, pool, Arc::new(backend)))
    }

    /// Create state around any backend implementation.
    #[must_use]
    pub fn with_backend(
        config: StorefrontConfig,
        pool: PgPool,
        backend: Arc<dyn StoreBackend>,
    ) -> Self {
        let debouncer = LookupDebouncer::new(config.lookup_debounce);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
                debouncer,
                remembered: RememberedCustomers::default(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session store connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn backend(&self) -> &dyn StoreBackend {
        self.inner.backend.as_ref()
    }

    /// Debouncer for checkout customer lookups.
    #[must_use]
    pub fn debouncer(&self) -> &LookupDebouncer {
        &self.inner.debouncer
    }

    /// Customer matches from the checkout lookup, by checkout token.
    #[must_use]
    pub fn remembered(&self) -> &RememberedCustomers {
        &self.inner.remembered
    }
}
