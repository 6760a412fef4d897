//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! stricter settings than the storefront (SameSite=Strict, 12h expiry).

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "pb_admin_session";

/// Session expiry time in seconds (12 hours).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Schema holding the admin session table.
pub const SESSION_SCHEMA: &str = "admin";

/// Admin session table name.
pub const SESSION_TABLE: &str = "session";

/// The session store was given an unusable schema or table name.
#[derive(Debug, Error)]
#[error("Invalid session store name: {0}")]
pub struct SessionStoreError(pub String);

/// The admin session store, shared by the server and `pb-cli migrate admin`.
///
/// # Errors
///
/// Returns `SessionStoreError` if the schema or table name is rejected.
pub fn admin_session_store(pool: &PgPool) -> Result<PostgresStore, SessionStoreError> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(SessionStoreError)?
        .with_table_name(SESSION_TABLE)
        .map_err(SessionStoreError)
}

/// Create the session layer with the `PostgreSQL` store.
///
/// # Errors
///
/// Returns `SessionStoreError` if the store cannot be configured.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionStoreError> {
    Ok(configure(admin_session_store(pool)?, config.is_secure()))
}

/// Apply the admin cookie settings to any session store.
#[must_use]
pub fn configure<Store>(store: Store, secure: bool) -> SessionManagerLayer<Store>
where
    Store: SessionStore,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(secure)
        // Strict: the dashboard is never reached from another site
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
