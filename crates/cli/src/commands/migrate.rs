//! Database migration commands.
//!
//! Both binaries keep only their sessions in `PostgreSQL`; the backend API
//! owns every other record. A migration here creates the session table the
//! server expects.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Both fall back to `DATABASE_URL`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use painboul_admin::middleware::{SessionStoreError, admin_session_store};

/// Errors raised while migrating a session store.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
}

/// Create the storefront session table (`tower_sessions.session`).
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running storefront migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin session table (`admin.session`).
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn admin() -> Result<(), MigrationError> {
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Running admin migrations...");
    admin_session_store(&pool)?.migrate().await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}

async fn connect(key: &'static str) -> Result<PgPool, MigrationError> {
    let _ = dotenvy::dotenv();

    let url = database_url(key, |k| std::env::var(k).ok())?;
    tracing::info!(env = key, "Connecting to database...");
    Ok(PgPoolOptions::new()
        .max_connections(1)
        .connect(url.expose_secret())
        .await?)
}

/// Resolve `key`, then `DATABASE_URL`.
fn database_url(
    key: &'static str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, MigrationError> {
    lookup(key)
        .or_else(|| lookup("DATABASE_URL"))
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_prefers_specific_key() {
        let url = database_url("ADMIN_DATABASE_URL", |k| match k {
            "ADMIN_DATABASE_URL" => Some("postgres://localhost/pb_admin".to_string()),
            "DATABASE_URL" => Some("postgres://localhost/other".to_string()),
            _ => None,
        });
        assert!(matches!(url, Ok(u) if u.expose_secret() == "postgres://localhost/pb_admin"));
    }

    #[test]
    fn test_database_url_falls_back() {
        let url = database_url("STOREFRONT_DATABASE_URL", |k| {
            (k == "DATABASE_URL").then(|| "postgres://localhost/fly".to_string())
        });
        assert!(matches!(url, Ok(u) if u.expose_secret() == "postgres://localhost/fly"));
    }

    #[test]
    fn test_database_url_missing() {
        let url = database_url("ADMIN_DATABASE_URL", |_| None);
        assert!(matches!(
            url,
            Err(MigrationError::MissingEnvVar("ADMIN_DATABASE_URL"))
        ));
    }
}
