//! Cart persistence.
//!
//! The cart lives in the visitor's session under [`session_keys::CART`]. The
//! [`CartRepository`] port hides that detail from [`super::CartStore`] and
//! lets tests run against [`MemoryCartRepository`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tower_sessions::Session;

use painboul_core::{Cart, CartItem};

use crate::models::session_keys;

/// Errors raised by cart repository adapters.
#[derive(Debug, Error)]
pub enum CartStorageError {
    /// The backing store could not be read or written.
    #[error("cart storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data did not parse as a cart.
    #[error("stored cart is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<tower_sessions::session::Error> for CartStorageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Port for loading and saving a visitor's cart.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load the stored cart. `Ok(None)` means nothing was stored yet.
    async fn load(&self) -> Result<Option<Cart>, CartStorageError>;

    /// Replace the stored cart.
    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError>;
}

/// Parse a stored cart, normalizing duplicate and zero-quantity lines.
fn decode(value: serde_json::Value) -> Result<Cart, CartStorageError> {
    let items: Vec<CartItem> = serde_json::from_value(value)?;
    Ok(Cart::from_items(items))
}

/// Session-backed cart repository used in production.
#[derive(Debug, Clone)]
pub struct SessionCartRepository {
    session: Session,
}

impl SessionCartRepository {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CartRepository for SessionCartRepository {
    async fn load(&self) -> Result<Option<Cart>, CartStorageError> {
        // Read raw JSON first so a bad payload is told apart from a store failure.
        let raw = self
            .session
            .get::<serde_json::Value>(session_keys::CART)
            .await?;
        raw.map(decode).transpose()
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

/// In-memory cart repository for tests.
///
/// Holds raw JSON so tests can seed malformed payloads, and can be told to
/// fail writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartRepository {
    stored: Arc<Mutex<Option<serde_json::Value>>>,
    fail_writes: bool,
}

impl MemoryCartRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored.
    #[must_use]
    pub fn with_raw(value: serde_json::Value) -> Self {
        Self {
            stored: Arc::new(Mutex::new(Some(value))),
            fail_writes: false,
        }
    }

    /// Make every `save` fail.
    #[must_use]
    pub const fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// The raw value currently stored.
    #[must_use]
    pub fn raw(&self) -> Option<serde_json::Value> {
        self.stored.lock().ok().and_then(|stored| stored.clone())
    }
}

#[async_trait]
impl CartRepository for MemoryCartRepository {
    async fn load(&self) -> Result<Option<Cart>, CartStorageError> {
        self.raw().map(decode).transpose()
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStorageError> {
        if self.fail_writes {
            return Err(CartStorageError::Unavailable("writes disabled".to_string()));
        }
        let value = serde_json::to_value(cart)?;
        let mut stored = self
            .stored
            .lock()
            .map_err(|e| CartStorageError::Unavailable(e.to_string()))?;
        *stored = Some(value);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_memory_repository_starts_empty() {
        let repo = MemoryCartRepository::new();
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_repository_rejects_malformed_payload() {
        let repo = MemoryCartRepository::with_raw(json!({"not": "a cart"}));
        assert!(matches!(
            repo.load().await,
            Err(CartStorageError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_decode_normalizes_stored_lines() {
        let repo = MemoryCartRepository::with_raw(json!([
            {"product": {"idProduct": 7, "name": "Croissant", "price": 4000}, "quantity": 2},
            {"product": {"idProduct": 7, "name": "Croissant", "price": 4000}, "quantity": 1},
            {"product": {"idProduct": 9, "name": "Brioche", "price": 3000}, "quantity": 0}
        ]));
        let cart = repo.load().await.unwrap().unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[tokio::test]
    async fn test_session_repository_round_trip() {
        let session = session();
        let repo = SessionCartRepository::new(session.clone());
        assert!(repo.load().await.unwrap().is_none());

        let cart: Cart = serde_json::from_value(json!([
            {"product": {"idProduct": 12, "name": "Tarte", "price": 9500}, "quantity": 1}
        ]))
        .unwrap();
        repo.save(&cart).await.unwrap();

        let reloaded = SessionCartRepository::new(session).load().await.unwrap();
        assert_eq!(reloaded, Some(cart));
    }

    #[tokio::test]
    async fn test_session_repository_reports_malformed_payload() {
        let session = session();
        session
            .insert(session_keys::CART, "definitely not a cart")
            .await
            .unwrap();
        let repo = SessionCartRepository::new(session);
        assert!(matches!(
            repo.load().await,
            Err(CartStorageError::Malformed(_))
        ));
    }
}
