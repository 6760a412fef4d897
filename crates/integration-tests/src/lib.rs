//! Integration test harness for Pain Boulé.
//!
//! Each test boots the real storefront or admin router on an ephemeral port
//! and drives it with a cookie-keeping `reqwest` client, exactly as a
//! browser session would. The bakery backend is replaced by an in-memory
//! fake that records every call; sessions live in a `MemoryStore`, so no
//! database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p painboul-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use tower_sessions::MemoryStore;

use painboul_core::{
    AdminRole, BlogPost, Category, CategoryId, CategoryInput, Customer, CustomerId,
    CustomerInput, Email, NewOrder, Order, OrderId, OrderStatus, Price, Product, ProductId,
    ProductInput,
};

use painboul_admin::backend::{AdminBackend, AuthenticatedUser, BackendError as AdminError};
use painboul_admin::config::AdminConfig;
use painboul_storefront::backend::{BackendError as StoreError, StoreBackend};
use painboul_storefront::config::{BackendConfig, StorefrontConfig};

/// Backend URL baked into test configs; nothing listens there.
pub const UNUSED_BACKEND: &str = "http://127.0.0.1:9/";

// =============================================================================
// Servers and clients
// =============================================================================

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Browser-like client: keeps cookies, does not follow redirects.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build test client")
}

/// Pool that never connects; only the readiness probe would touch it.
#[must_use]
pub fn lazy_pool() -> PgPool {
    PgPool::connect_lazy("postgres://painboul@127.0.0.1:1/unused").expect("lazy pool")
}

/// Storefront config for tests, with a short lookup quiet period.
#[must_use]
pub fn storefront_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://painboul@127.0.0.1:1/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend: BackendConfig {
            base_url: UNUSED_BACKEND.parse().unwrap(),
            timeout: Duration::from_secs(1),
        },
        lookup_debounce: Duration::from_millis(50),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

#[must_use]
pub fn admin_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://painboul@127.0.0.1:1/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend_url: UNUSED_BACKEND.parse().unwrap(),
        backend_timeout: Duration::from_secs(1),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Boot the storefront around `backend` and return its base URL.
pub async fn spawn_storefront(backend: Arc<FakeStoreBackend>) -> String {
    let state = painboul_storefront::state::AppState::with_backend(
        storefront_config(),
        lazy_pool(),
        backend,
    );
    let session_layer =
        painboul_storefront::middleware::session::configure(MemoryStore::default(), false);
    spawn(painboul_storefront::routes::app(state, session_layer)).await
}

/// Boot the admin dashboard around `backend` and return its base URL.
pub async fn spawn_admin(backend: Arc<FakeAdminBackend>) -> String {
    let state = painboul_admin::state::AppState::with_backend(admin_config(), lazy_pool(), backend);
    let session_layer =
        painboul_admin::middleware::session::configure(MemoryStore::default(), false);
    spawn(painboul_admin::routes::app(state, session_layer)).await
}

// =============================================================================
// Fixtures
// =============================================================================

#[must_use]
pub fn product(id: i64, name: &str, ariary: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: None,
        price: Some(Price::from_ariary(ariary)),
        image: None,
        category_id: Some(CategoryId::new(1)),
        category_name: Some("Viennoiseries".to_string()),
    }
}

#[must_use]
pub fn customer(id: i64, email: &str) -> Customer {
    Customer {
        id: CustomerId::new(id),
        first_name: "Hery".to_string(),
        last_name: "Rakoto".to_string(),
        email: email.to_string(),
        phone: "034 11 222 33".to_string(),
        address: "Lot II A 12 Ivandry".to_string(),
    }
}

#[must_use]
pub fn order(id: i64, status: OrderStatus, customer_id: Option<i64>) -> Order {
    Order {
        id: OrderId::new(id),
        customer_id: customer_id.map(CustomerId::new),
        items: Vec::new(),
        order_date: None,
        status,
        total_amount: Price::from_ariary(12_000),
        customer_name: None,
        customer_email: None,
        customer_phone: None,
    }
}

/// A complete checkout form for `email`.
#[must_use]
pub fn checkout_form(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("first_name", "Hery".to_string()),
        ("last_name", "Rakoto".to_string()),
        ("email", email.to_string()),
        ("phone", "034 11 222 33".to_string()),
        ("address", "Lot II A 12 Ivandry".to_string()),
        ("delivery_time", "2026-10-20T08:00".to_string()),
        ("notes", String::new()),
    ]
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// Storefront fake
// =============================================================================

/// A call the storefront made to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetProduct(ProductId),
    FindCustomer(String),
    CreateCustomer(CustomerInput),
    UpdateCustomer(CustomerId, CustomerInput),
    CreateOrder(NewOrder),
}

/// In-memory storefront backend.
#[derive(Debug, Default)]
pub struct FakeStoreBackend {
    products: Vec<Product>,
    customers: Mutex<Vec<Customer>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_orders: bool,
    next_id: Mutex<i64>,
}

impl FakeStoreBackend {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_customer(self, customer: Customer) -> Self {
        lock(&self.customers).push(customer);
        self
    }

    /// Make `create_order` fail with a 500.
    #[must_use]
    pub const fn failing_orders(mut self) -> Self {
        self.fail_orders = true;
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Calls that write to the backend.
    #[must_use]
    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    StoreCall::CreateCustomer(_)
                        | StoreCall::UpdateCustomer(..)
                        | StoreCall::CreateOrder(_)
                )
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }

    fn next_id(&self) -> i64 {
        let mut id = lock(&self.next_id);
        *id += 1;
        *id
    }
}

#[async_trait]
impl StoreBackend for FakeStoreBackend {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.record(StoreCall::GetProduct(id));
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(vec![Category {
            id: CategoryId::new(1),
            name: "Viennoiseries".to_string(),
        }])
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, StoreError> {
        Ok(Vec::new())
    }

    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, StoreError> {
        self.record(StoreCall::FindCustomer(email.as_str().to_string()));
        Ok(lock(&self.customers)
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, StoreError> {
        self.record(StoreCall::CreateCustomer(input.clone()));
        let created = Customer {
            id: CustomerId::new(self.next_id()),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
        };
        lock(&self.customers).push(created.clone());
        Ok(created)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, StoreError> {
        self.record(StoreCall::UpdateCustomer(id, input.clone()));
        Ok(Customer {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
        })
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.record(StoreCall::CreateOrder(order.clone()));
        if self.fail_orders {
            return Err(StoreError::Status {
                status: 500,
                body: "database unavailable".to_string(),
            });
        }
        Ok(Order {
            id: OrderId::new(self.next_id()),
            customer_id: Some(order.customer_id),
            items: order.items.clone(),
            order_date: Some(order.order_date),
            status: order.status,
            total_amount: order.total_amount,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
        })
    }
}

// =============================================================================
// Admin fake
// =============================================================================

/// A write the dashboard made to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    Login(String),
    /// file name, content type, size in bytes
    UploadImage(String, String, usize),
    CreateProduct(ProductInput),
    UpdateProduct(ProductId, ProductInput),
    UpdateStatus(OrderId, OrderStatus),
    DeleteOrder(OrderId),
    GetCustomer(CustomerId),
}

/// In-memory admin backend with a fixed set of accounts.
#[derive(Debug, Default)]
pub struct FakeAdminBackend {
    /// email -> (password, role)
    accounts: HashMap<String, (String, AdminRole)>,
    orders: Mutex<Vec<Order>>,
    customers: Vec<Customer>,
    calls: Mutex<Vec<AdminCall>>,
}

impl FakeAdminBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str, role: AdminRole) -> Self {
        self.accounts
            .insert(email.to_string(), (password.to_string(), role));
        self
    }

    #[must_use]
    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        *lock(&self.orders) = orders;
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<AdminCall> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.orders).clone()
    }

    fn record(&self, call: AdminCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl AdminBackend for FakeAdminBackend {
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, AdminError> {
        use secrecy::ExposeSecret;

        self.record(AdminCall::Login(email.to_string()));
        match self.accounts.get(email) {
            Some((expected, role)) if expected == password.expose_secret() => {
                Ok(AuthenticatedUser {
                    id: Some(1),
                    email: email.to_string(),
                    role: role.clone(),
                })
            }
            _ => Err(AdminError::InvalidCredentials),
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        Ok(vec![product(7, "Croissant", 4000)])
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, AdminError> {
        (id == ProductId::new(7))
            .then(|| product(7, "Croissant", 4000))
            .ok_or_else(|| AdminError::NotFound(format!("product {id}")))
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, AdminError> {
        self.record(AdminCall::CreateProduct(input.clone()));
        Ok(Product {
            id: ProductId::new(8),
            name: input.name.clone(),
            description: None,
            price: Some(input.price),
            image: input.image.clone(),
            category_id: None,
            category_name: input.category_name.clone(),
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, AdminError> {
        self.record(AdminCall::UpdateProduct(id, input.clone()));
        Ok(Product {
            id,
            name: input.name.clone(),
            description: None,
            price: Some(input.price),
            image: input.image.clone(),
            category_id: None,
            category_name: input.category_name.clone(),
        })
    }

    async fn delete_product(&self, _id: ProductId) -> Result<(), AdminError> {
        Ok(())
    }

    /// Stores nothing; answers with the path the real backend would.
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AdminError> {
        self.record(AdminCall::UploadImage(
            file_name.to_string(),
            content_type.to_string(),
            bytes.len(),
        ));
        Ok(format!("uploads/{file_name}"))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AdminError> {
        Ok(vec![Category {
            id: CategoryId::new(1),
            name: "Viennoiseries".to_string(),
        }])
    }

    async fn create_category(&self, input: &CategoryInput) -> Result<Category, AdminError> {
        Ok(Category {
            id: CategoryId::new(2),
            name: input.name.clone(),
        })
    }

    async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, AdminError> {
        Ok(Category {
            id,
            name: input.name.clone(),
        })
    }

    async fn delete_category(&self, _id: CategoryId) -> Result<(), AdminError> {
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AdminError> {
        Ok(self.orders())
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), AdminError> {
        self.record(AdminCall::UpdateStatus(id, status));
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), AdminError> {
        self.record(AdminCall::DeleteOrder(id));
        let mut orders = lock(&self.orders);
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(AdminError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Customer, AdminError> {
        self.record(AdminCall::GetCustomer(id));
        self.customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("customer {id}")))
    }
}
