//! Database access for storefront `PostgreSQL`.
//!
//! # Database: `pb_storefront`
//!
//! The bakery backend owns products, customers and orders. The only local
//! table is `tower_sessions.session`, which holds visitor sessions and
//! their carts. Create it with:
//!
//! ```bash
//! cargo run -p painboul-cli -- migrate storefront
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool for the session store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
