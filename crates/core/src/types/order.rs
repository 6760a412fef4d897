//! Orders and their line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::{CustomerId, OrderId, ProductId};
use super::price::Price;
use super::status::OrderStatus;

/// A line item: a snapshot of a product at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(alias = "productName")]
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// Payload for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Price,
}

impl NewOrder {
    /// Build a pending order for `customer_id` from the cart contents.
    ///
    /// Each cart line becomes a snapshot of the product's id, name and price.
    #[must_use]
    pub fn from_cart(customer_id: CustomerId, cart: &Cart, order_date: DateTime<Utc>) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| OrderItem {
                product_id: item.product.id,
                name: item.product.name.clone(),
                price: item.product.unit_price(),
                quantity: item.quantity,
            })
            .collect();

        Self {
            customer_id,
            items,
            order_date,
            status: OrderStatus::Pending,
            total_amount: cart.total_price(),
        }
    }
}

/// An order as stored by the backend.
///
/// Older backend builds answer with `idOrder` instead of `id`; both are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "idOrder")]
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

impl Order {
    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}
