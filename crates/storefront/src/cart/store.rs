//! The per-request cart store.

use tracing::instrument;

use painboul_core::{Cart, Price, Product, ProductId};

use super::repository::CartRepository;

/// A visitor's cart plus the repository it persists to.
///
/// Every mutation is written through to the repository immediately. Storage
/// failures never fail the request: a failed load yields an empty cart and a
/// failed save keeps the change for this request only.
#[derive(Debug)]
pub struct CartStore<R> {
    repository: R,
    cart: Cart,
}

impl<R: CartRepository> CartStore<R> {
    /// Restore the cart from `repository`.
    ///
    /// Missing or malformed data yields an empty cart.
    pub async fn load(repository: R) -> Self {
        let cart = match repository.load().await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart");
                Cart::default()
            }
        };
        Self { repository, cart }
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&mut self, product: Product, quantity: u32) {
        self.cart.add(product, quantity);
        self.persist().await;
    }

    /// Set a line's quantity; zero or less removes it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        self.cart.update_quantity(product_id, quantity);
        self.persist().await;
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&mut self, product_id: ProductId) {
        self.cart.remove(product_id);
        self.persist().await;
    }

    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.cart).await {
            tracing::warn!(error = %e, "Failed to persist cart, keeping it in memory");
        }
    }
}
