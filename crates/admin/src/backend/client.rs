//! HTTP adapter for the bakery backend (dashboard side).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use painboul_core::{
    Category, CategoryId, CategoryInput, Customer, CustomerId, Order, OrderId, OrderStatus,
    Product, ProductId, ProductInput,
};

use super::{AdminBackend, AuthenticatedUser, BackendError};

const ERROR_BODY_LIMIT: usize = 300;

/// Client for the bakery backend API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("painboul-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner { client, base_url }),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the raw body of a successful response.
    async fn send_raw(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::warn!(status = %status, body = %body, "Backend returned non-success status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, BackendError> {
        let body = self.send_raw(request, what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, what, "Failed to parse backend response");
            BackendError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<(), BackendError> {
        self.send_raw(request, what).await.map(|_| ())
    }
}

#[async_trait]
impl AdminBackend for BackendClient {
    #[instrument(skip(self, password))]
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, BackendError> {
        let url = self.endpoint(&["users", "login"])?;
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        match self.send(self.inner.client.post(url).json(&body), "user").await {
            Err(BackendError::Status { status, .. }) if matches!(status, 400 | 401 | 403) => {
                Err(BackendError::InvalidCredentials)
            }
            Err(BackendError::NotFound(_)) => Err(BackendError::InvalidCredentials),
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(&["products"])?;
        self.send(self.inner.client.get(url), "products").await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "products", &id])?;
        self.send(self.inner.client.get(url), &format!("product {id}"))
            .await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_product(&self, input: &ProductInput) -> Result<Product, BackendError> {
        let url = self.endpoint(&["products"])?;
        self.send(self.inner.client.post(url).json(input), "products")
            .await
    }

    #[instrument(skip(self, input), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["products", &id])?;
        self.send(
            self.inner.client.put(url).json(input),
            &format!("product {id}"),
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["products", &id])?;
        self.send_empty(self.inner.client.delete(url), &format!("product {id}"))
            .await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&["api", "upload", "image"])?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let request = self
            .inner
            .client
            .post(url)
            .multipart(Form::new().part("file", part));

        // The backend answers with the stored path as plain text.
        let path = self.send_raw(request, "image upload").await?;
        let path = path.trim();
        if path.is_empty() {
            return Err(BackendError::MissingImagePath);
        }
        Ok(path.to_string())
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let url = self.endpoint(&["categories"])?;
        self.send(self.inner.client.get(url), "categories").await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, BackendError> {
        let url = self.endpoint(&["categories"])?;
        self.send(self.inner.client.post(url).json(input), "categories")
            .await
    }

    #[instrument(skip(self, input), fields(category_id = %id))]
    async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["categories", &id])?;
        self.send(
            self.inner.client.put(url).json(input),
            &format!("category {id}"),
        )
        .await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn delete_category(&self, id: CategoryId) -> Result<(), BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["categories", &id])?;
        self.send_empty(self.inner.client.delete(url), &format!("category {id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
        let url = self.endpoint(&["api", "orders"])?;
        self.send(self.inner.client.get(url), "orders").await
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        let id = id.to_string();
        let mut url = self.endpoint(&["api", "orders", &id, "status"])?;
        url.query_pairs_mut().append_pair("status", status.as_str());
        self.send_empty(self.inner.client.put(url), &format!("order {id}"))
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: OrderId) -> Result<(), BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "orders", &id])?;
        self.send_empty(self.inner.client.delete(url), &format!("order {id}"))
            .await
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "customers", &id])?;
        self.send(self.inner.client.get(url), &format!("customer {id}"))
            .await
    }
}
