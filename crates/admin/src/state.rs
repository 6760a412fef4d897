//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::{AdminBackend, BackendClient, BackendError};
use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    backend: Arc<dyn AdminBackend>,
}

impl AppState {
    /// Create the production state with the HTTP backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(config.backend_url.clone(), config.backend_timeout)?;
        Ok(Self::with_backend(config, pool, Arc::new(backend)))
    }

    /// Create state around any backend implementation.
    #[must_use]
    pub fn with_backend(config: AdminConfig, pool: PgPool, backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn backend(&self) -> &dyn AdminBackend {
        self.inner.backend.as_ref()
    }
}
