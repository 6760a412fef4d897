//! HTTP adapter for the bakery backend.
//!
//! Plain JSON over `reqwest` 0.13. Paths are built segment by segment with
//! `url`, so values such as emails are percent-encoded once and only once.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use painboul_core::{
    BlogPost, Category, Customer, CustomerId, CustomerInput, Email, NewOrder, Order, Product,
    ProductId,
};

use super::{BackendError, StoreBackend};
use crate::config::BackendConfig;

/// Longest slice of an error body kept in logs and errors.
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

/// `GET /api/blog` wraps its list.
#[derive(Debug, Deserialize)]
struct BlogResponse {
    #[serde(default)]
    posts: Vec<BlogPost>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("painboul-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Build an endpoint URL from path segments, encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| BackendError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request and decode the JSON body.
    ///
    /// A 404 maps to `BackendError::NotFound(what)`; any other non-success
    /// status becomes `BackendError::Status` with a truncated body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::warn!(
                status = %status,
                body = %body,
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }
}

#[async_trait]
impl StoreBackend for BackendClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(&["products"])?;
        let products: Vec<Product> = self.send(self.inner.client.get(url), "products").await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "products", &id])?;
        self.send(self.inner.client.get(url), &format!("product {id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let url = self.endpoint(&["categories"])?;
        self.send(self.inner.client.get(url), "categories").await
    }

    #[instrument(skip(self))]
    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, BackendError> {
        let url = self.endpoint(&["api", "blog"])?;
        let response: BlogResponse = self.send(self.inner.client.get(url), "blog").await?;
        Ok(response.posts)
    }

    #[instrument(skip(self, email))]
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, BackendError> {
        let url = self.endpoint(&["api", "customers", "email", email.as_str()])?;
        match self.send(self.inner.client.get(url), "customer").await {
            Ok(customer) => Ok(Some(customer)),
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, input))]
    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, BackendError> {
        let url = self.endpoint(&["api", "customers"])?;
        self.send(self.inner.client.post(url).json(input), "customers")
            .await
    }

    #[instrument(skip(self, input), fields(customer_id = %id))]
    async fn update_customer(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "customers", &id])?;
        self.send(
            self.inner.client.put(url).json(input),
            &format!("customer {id}"),
        )
        .await
    }

    #[instrument(skip(self, order), fields(customer_id = %order.customer_id, items = order.items.len()))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let url = self.endpoint(&["api", "orders"])?;
        self.send(self.inner.client.post(url).json(order), "orders")
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::parse_backend_url;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: parse_backend_url(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://localhost:8080");
        assert_eq!(
            client.endpoint(&["api", "orders"]).unwrap().as_str(),
            "http://localhost:8080/api/orders"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://api.painboule.mg/v1/");
        assert_eq!(
            client.endpoint(&["products"]).unwrap().as_str(),
            "https://api.painboule.mg/v1/products"
        );
    }

    #[test]
    fn test_endpoint_encodes_email_segment() {
        let client = client("http://localhost:8080");
        let url = client
            .endpoint(&["api", "customers", "email", "odd/name @example.mg"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/api/customers/email/odd%2Fname%20@example.mg"
        );
    }

    #[test]
    fn test_blog_response_tolerates_missing_posts() {
        let response: BlogResponse = serde_json::from_str("{}").unwrap();
        assert!(response.posts.is_empty());

        let response: BlogResponse =
            serde_json::from_str(r#"{"posts":[{"id":1,"title":"Le levain"}]}"#).unwrap();
        assert_eq!(response.posts[0].title, "Le levain");
    }
}
