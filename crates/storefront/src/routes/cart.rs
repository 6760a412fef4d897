//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the visitor session (see [`crate::cart`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tracing::instrument;

use painboul_core::{Cart, ProductId};

use crate::cart::SessionCart;
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// HTMX response header that fires client-side events.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Event fired whenever the cart changes, so badges refresh.
pub const CART_UPDATED: &str = "cart-updated";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
    /// Quantity posted by the "-" button (zero removes the line).
    pub decrement: i64,
    /// Quantity posted by the "+" button.
    pub increment: i64,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, image_base: &str) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| {
                let quantity = i64::from(item.quantity);
                CartItemView {
                    product_id: item.product.id.as_i64(),
                    name: item.product.name.clone(),
                    quantity: item.quantity,
                    price: item.product.unit_price().display(),
                    line_price: item.line_total().display(),
                    image_url: item.product.image_url(image_base),
                    decrement: quantity - 1,
                    increment: quantity + 1,
                }
            })
            .collect();

        Self {
            items,
            subtotal: cart.total_price().display(),
            item_count: cart.total_items(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: Option<u32>,
}

/// Update cart form data. Zero or negative removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i64,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i64,
}

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn drawer(state: &AppState, cart: &SessionCart) -> CartDrawerTemplate {
    CartDrawerTemplate {
        cart: CartView::new(cart.cart(), state.config().backend.base_url.as_str()),
    }
}

/// Display the cart drawer (HTMX).
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, cart: SessionCart) -> impl IntoResponse {
    drawer(&state, &cart)
}

/// Add item to cart (HTMX).
///
/// The product is fetched from the backend so the cart stores the current
/// name and price. Returns the count badge and fires `cart-updated`.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let product = state
        .backend()
        .get_product(ProductId::new(form.product_id))
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("product_id", &form.product_id.to_string())],
    );
    cart.add_item(product, form.quantity.unwrap_or(1)).await;

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    ))
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, cart))]
pub async fn update(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<UpdateCartForm>,
) -> impl IntoResponse {
    cart.update_quantity(ProductId::new(form.product_id), form.quantity)
        .await;
    (
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        drawer(&state, &cart),
    )
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, cart))]
pub async fn remove(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<RemoveFromCartForm>,
) -> impl IntoResponse {
    cart.remove_item(ProductId::new(form.product_id)).await;
    (
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        drawer(&state, &cart),
    )
}

/// Empty the cart (HTMX).
#[instrument(skip(state, cart))]
pub async fn clear(State(state): State<AppState>, mut cart: SessionCart) -> impl IntoResponse {
    cart.clear().await;
    (
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        drawer(&state, &cart),
    )
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.total_items(),
    }
}
