//! Bakery backend API access.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products, categories, customers
//!   and orders; the storefront keeps no copy of any of them
//! - Handlers depend on the [`StoreBackend`] port, never on the HTTP client,
//!   so tests can swap in a fake or a mock
//! - [`BackendClient`] is the production adapter (JSON over `reqwest`)
//!
//! # Example
//!
//! ```rust,ignore
//! use painboul_storefront::backend::{BackendClient, StoreBackend};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.list_products().await?;
//! ```

mod client;

pub use client::BackendClient;

use async_trait::async_trait;
use thiserror::Error;

use painboul_core::{
    BlogPost, Category, Customer, CustomerId, CustomerInput, Email, NewOrder, Order, Product,
    ProductId,
};

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Port for every backend call the storefront makes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// `GET /products`
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// `GET /api/products/{id}`
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError>;

    /// `GET /categories`
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// `GET /api/blog`
    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, BackendError>;

    /// `GET /api/customers/email/{email}`; a 404 is `Ok(None)`.
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, BackendError>;

    /// `POST /api/customers`
    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, BackendError>;

    /// `PUT /api/customers/{id}`
    async fn update_customer(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, BackendError>;

    /// `POST /api/orders`
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 7".to_string());
        assert_eq!(err.to_string(), "Not found: product 7");
        assert!(err.is_not_found());

        let err = BackendError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 500: boom");
        assert!(!err.is_not_found());
    }
}
