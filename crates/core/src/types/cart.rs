//! The shopping cart.
//!
//! A [`Cart`] is an ordered list of lines, one per product id. It is pure
//! data: persistence lives in the storefront's cart repository.

use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;
use super::price::Price;

/// One cart line: a product snapshot and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.unit_price() * self.quantity
    }
}

/// Shopping cart contents.
///
/// Lines keep insertion order. No two lines share a product id and no line
/// has a zero quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from stored lines, dropping zero-quantity lines and
    /// merging duplicates so the invariants hold.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            cart.add(item.product, item.quantity);
        }
        cart
    }

    /// Add `quantity` units of `product`.
    ///
    /// If the product is already in the cart its quantity grows and the
    /// stored snapshot is kept; otherwise a new line is appended. Adding zero
    /// does nothing.
    pub fn add(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.position(product.id) {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line.quantity.saturating_add(quantity);
            }
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    /// Set the quantity of a product. Zero or less removes the line; an
    /// unknown product id is ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(index) = self.position(product_id) {
            self.items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove a product's line, if present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Quantity of a product currently in the cart (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.position(product_id)
            .map_or(0, |index| self.items[index].quantity)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of price × quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart can be turned into an order: at least one line,
    /// every product id assigned and every quantity positive.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| item.product.id.is_assigned() && item.quantity > 0)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product.id == product_id)
    }
}
