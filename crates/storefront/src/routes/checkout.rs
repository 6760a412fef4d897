//! Checkout route handlers.
//!
//! The checkout page posts the form with HTMX. While the visitor types an
//! email, `GET /checkout/lookup` is called on every change; the server
//! debounces those calls per checkout token and answers the superseded ones
//! with `204 No Content`, which HTMX leaves alone.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use super::cart::{CART_UPDATED, CartView, HX_TRIGGER};
use crate::cart::SessionCart;
use crate::checkout::{CheckoutError, CheckoutForm, FieldErrors, lookup_customer, submit_order};
use crate::error::add_breadcrumb;
use crate::models::session_keys;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutPageTemplate {
    pub checkout: CheckoutFormView,
    pub cart_count: u32,
}

/// Checkout form fragment (re-rendered after a failed submit).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_form.html")]
pub struct CheckoutFormTemplate {
    pub checkout: CheckoutFormView,
}

/// Contact fields fragment (swapped in after an email lookup).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_fields.html")]
pub struct CheckoutFieldsTemplate {
    pub checkout: CustomerFieldsView,
}

/// Order confirmation fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_success.html")]
pub struct CheckoutSuccessTemplate {
    pub order_id: String,
    pub total: String,
}

/// Everything the checkout form templates render.
#[derive(Debug, Clone)]
pub struct CheckoutFormView {
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    /// Whether the email matched an existing customer.
    pub existing_customer: bool,
    /// Banner shown above the form.
    pub message: Option<&'static str>,
    pub cart: CartView,
}

/// What the lookup fragment renders: the customer fields only.
#[derive(Debug, Clone)]
pub struct CustomerFieldsView {
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    pub existing_customer: bool,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the checkout token, creating one on first use.
///
/// Debounced lookups and the remembered customer match are keyed by this
/// token, so two tabs of the same visitor share them.
async fn checkout_token(session: &Session) -> String {
    if let Some(token) = existing_checkout_token(session).await {
        return token;
    }
    let token = Uuid::new_v4().to_string();
    if let Err(e) = session.insert(session_keys::CHECKOUT_TOKEN, &token).await {
        tracing::warn!(error = %e, "Failed to store checkout token");
    }
    token
}

/// Read the checkout token without issuing one.
async fn existing_checkout_token(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CHECKOUT_TOKEN)
        .await
        .ok()
        .flatten()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, session, cart))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
) -> impl IntoResponse {
    // Lookups only read the token, so issue it with the page.
    checkout_token(&session).await;
    let message = cart
        .cart()
        .is_empty()
        .then_some(CheckoutError::EmptyCart.user_message());

    CheckoutPageTemplate {
        checkout: CheckoutFormView {
            form: CheckoutForm::default(),
            errors: FieldErrors::default(),
            existing_customer: false,
            message,
            cart: CartView::new(cart.cart(), state.config().backend.base_url.as_str()),
        },
        cart_count: cart.total_items(),
    }
}

/// Debounced customer lookup by email (HTMX).
///
/// On a match the name, phone, and address fields are replaced with the
/// stored record and the match is remembered for the submit. Otherwise any
/// earlier match is forgotten.
///
/// Never writes the session: the copy loaded here goes stale while the
/// debounce interval runs. A visitor without a checkout token has not
/// opened the checkout page, so there is nothing to fill in.
#[instrument(skip(state, session, form))]
pub async fn lookup(
    State(state): State<AppState>,
    session: Session,
    Query(mut form): Query<CheckoutForm>,
) -> Response {
    let Some(token) = existing_checkout_token(&session).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let backend = state.backend();
    let email = form.email.clone();

    let Some(found) = state
        .debouncer()
        .debounce(&token, || lookup_customer(backend, &email))
        .await
    else {
        return StatusCode::NO_CONTENT.into_response();
    };

    state.remembered().record(&token, found.as_ref()).await;
    if let Some(customer) = &found {
        form.apply_customer(customer);
    }

    CheckoutFieldsTemplate {
        checkout: CustomerFieldsView {
            form,
            errors: FieldErrors::default(),
            existing_customer: found.is_some(),
        },
    }
    .into_response()
}

/// Place the order (HTMX).
///
/// Success clears the cart and the remembered customer and returns the
/// confirmation. Validation problems answer 422 and backend failures 502,
/// both with the form re-rendered as submitted.
#[instrument(skip(state, session, cart, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    mut cart: SessionCart,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let token = existing_checkout_token(&session).await;
    let remembered = match &token {
        Some(token) => state.remembered().get(token).await,
        None => None,
    };
    let total = cart.total_price().display();

    match submit_order(state.backend(), &mut cart, &form, remembered.as_ref()).await {
        Ok(order) => {
            if let Some(token) = &token {
                state.remembered().forget(token).await;
            }
            add_breadcrumb(
                "checkout",
                "Order placed",
                &[("order_id", &order.id.to_string())],
            );
            (
                AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
                CheckoutSuccessTemplate {
                    order_id: order.id.to_string(),
                    total,
                },
            )
                .into_response()
        }
        Err(e) => {
            let status = if e.is_retryable() {
                tracing::warn!(error = %e, "Order submission failed");
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            let errors = match &e {
                CheckoutError::Invalid(errors) => errors.clone(),
                _ => FieldErrors::default(),
            };
            let existing_customer = remembered
                .as_ref()
                .is_some_and(|r| r.applies_to(&form.email));

            (
                status,
                CheckoutFormTemplate {
                    checkout: CheckoutFormView {
                        form,
                        errors,
                        existing_customer,
                        message: Some(e.user_message()),
                        cart: CartView::new(
                            cart.cart(),
                            state.config().backend.base_url.as_str(),
                        ),
                    },
                },
            )
                .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use painboul_core::Cart;

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            email: "hery@example.mg".to_string(),
            address: "Lot II A 12 Ivandry".to_string(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_lookup_fragment_leaves_email_input_alone() {
        let html = CheckoutFieldsTemplate {
            checkout: CustomerFieldsView {
                form: form(),
                errors: FieldErrors::default(),
                existing_customer: true,
            },
        }
        .render()
        .unwrap();

        assert!(!html.contains(r#"name="email""#));
        assert!(html.contains(r#"name="first_name""#));
        assert!(html.contains("Lot II A 12 Ivandry"));
        assert!(html.contains("Welcome back"));
    }

    #[test]
    fn test_email_input_sits_outside_swapped_block() {
        let html = CheckoutFormTemplate {
            checkout: CheckoutFormView {
                form: form(),
                errors: FieldErrors::default(),
                existing_customer: false,
                message: None,
                cart: CartView::new(&Cart::default(), "http://localhost:8080/"),
            },
        }
        .render()
        .unwrap();

        let email = html.find(r#"name="email""#).unwrap();
        let swapped = html.find(r#"<div id="customer-fields">"#).unwrap();
        assert!(email < swapped);
        assert!(html.contains(r##"hx-target="#customer-fields""##));
    }
}
