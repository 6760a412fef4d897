//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (session database)
//!
//! # Auth (credentials checked by the bakery backend)
//! GET  /auth/login                 - Login page (?callback_url, ?error)
//! POST /auth/login                 - Check credentials, start session
//! POST /auth/logout                - End session
//!
//! # Dashboard
//! GET  /                           - Counts of products, categories, orders
//!
//! # Products
//! GET  /products                   - Product listing
//! GET  /products/new               - Create form
//! POST /products                   - Create product (multipart, optional image)
//! GET  /products/{id}/edit         - Edit form
//! POST /products/{id}              - Update product (multipart, optional image)
//! POST /products/{id}/delete       - Delete product
//!
//! # Categories
//! GET  /categories                 - Category listing with create/rename forms
//! POST /categories                 - Create category
//! POST /categories/{id}            - Rename category
//! POST /categories/{id}/delete     - Delete category
//!
//! # Orders
//! GET  /orders                     - Order listing (?status, ?q)
//! GET  /orders/{id}                - Order detail
//! POST /orders/{id}/status         - Change status
//! POST /orders/{id}/delete         - Delete order
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::state::AppState;

/// Banner text for a `?notice=` code set by a redirect.
#[must_use]
pub fn notice_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "created" => Some("Saved."),
        "updated" => Some("Changes saved."),
        "deleted" => Some("Deleted."),
        "already_deleted" => Some("It was already deleted."),
        "status_updated" => Some("Order status updated."),
        "invalid_status" => Some("That status does not exist."),
        "invalid_name" => Some("A name is required."),
        "failed" => Some("The bakery backend did not accept the change. Please try again."),
        _ => None,
    }
}

/// Body limit for the product forms, which may carry an image.
fn upload_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(products::FORM_BODY_LIMIT)
}

/// Create all page routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .route("/", get(dashboard::index))
        .route(
            "/products",
            get(products::index).post(products::create).layer(upload_limit()),
        )
        .route("/products/new", get(products::new_form))
        .route(
            "/products/{id}",
            post(products::update).layer(upload_limit()),
        )
        .route("/products/{id}/edit", get(products::edit_form))
        .route("/products/{id}/delete", post(products::delete))
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/{id}", post(categories::rename))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/delete", post(orders::delete))
}

/// Build the complete admin application: routes, static files, sessions,
/// request tracing and Sentry.
pub fn app<Store>(state: AppState, session_layer: SessionManagerLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
