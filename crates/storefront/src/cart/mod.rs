//! Visitor cart: persistence port, adapters and the per-request store.
//!
//! Handlers take a [`SessionCart`] argument; the extractor restores the cart
//! from the visitor's session before the handler runs.
//!
//! ```rust,ignore
//! async fn add(mut cart: SessionCart, Form(form): Form<AddForm>) -> impl IntoResponse {
//!     cart.add_item(product, form.quantity).await;
//! }
//! ```

pub mod repository;
pub mod store;

pub use repository::{
    CartRepository, CartStorageError, MemoryCartRepository, SessionCartRepository,
};
pub use store::CartStore;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;

/// Cart store backed by the visitor's session.
pub type SessionCart = CartStore<SessionCartRepository>;

impl<S> FromRequestParts<S> for CartStore<SessionCartRepository>
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Ok(Self::load(SessionCartRepository::new(session)).await)
    }
}
