//! Bakery backend API access for the dashboard.
//!
//! The admin binary manages the catalog and orders through the same backend
//! the storefront reads from. Handlers depend on the [`AdminBackend`] port;
//! [`BackendClient`] is the `reqwest` adapter.

mod client;

pub use client::BackendClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use painboul_core::{
    AdminRole, Category, CategoryId, CategoryInput, Customer, CustomerId, Order, OrderId,
    OrderStatus, Product, ProductId, ProductInput,
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

    /// The login endpoint refused the email/password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The upload endpoint accepted the file but answered with no path.
    #[error("Backend returned no image path")]
    MissingImagePath,
}

impl BackendError {
    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// User returned by `POST /users/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub role: AdminRole,
}

/// Port for every backend call the dashboard makes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// `POST /users/login`; rejected credentials are
    /// [`BackendError::InvalidCredentials`].
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, BackendError>;

    /// `GET /products`
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// `GET /api/products/{id}`
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError>;

    /// `POST /products`
    async fn create_product(&self, input: &ProductInput) -> Result<Product, BackendError>;

    /// `PUT /products/{id}`
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, BackendError>;

    /// `DELETE /products/{id}`
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;

    /// `POST /api/upload/image` (multipart, field `file`).
    ///
    /// Returns the stored path, as the backend wants it in a product's
    /// `image`.
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;

    /// `GET /categories`
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// `POST /categories`
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, BackendError>;

    /// `PUT /categories/{id}`
    async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, BackendError>;

    /// `DELETE /categories/{id}`
    async fn delete_category(&self, id: CategoryId) -> Result<(), BackendError>;

    /// `GET /api/orders`
    async fn list_orders(&self) -> Result<Vec<Order>, BackendError>;

    /// `PUT /api/orders/{id}/status?status=STATUS`
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError>;

    /// `DELETE /api/orders/{id}`
    async fn delete_order(&self, id: OrderId) -> Result<(), BackendError>;

    /// `GET /api/customers/{id}`
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, BackendError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_user_parses_login_response() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"id":3,"email":"owner@painboule.mg","role":"owner"}"#)
                .unwrap();
        assert_eq!(user.id, Some(3));
        assert_eq!(user.role, AdminRole::Owner);

        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"email":"clerk@painboule.mg","role":"cashier"}"#).unwrap();
        assert_eq!(user.id, None);
        assert!(!user.role.can_access_dashboard());
    }

    #[test]
    fn test_backend_error_not_found() {
        assert!(BackendError::NotFound("order 4".to_string()).is_not_found());
        assert!(!BackendError::InvalidCredentials.is_not_found());
    }
}
