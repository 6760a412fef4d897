//! Session keys for visitor data.
//!
//! The visitor session is the only durable state the storefront owns. It
//! holds the cart and the checkout token.

/// Key holding the serialized cart.
pub const CART: &str = "painboul_cart_v1";

/// Key holding the checkout form token that debounced lookups and the
/// remembered customer match are keyed by.
pub const CHECKOUT_TOKEN: &str = "checkout_token";
