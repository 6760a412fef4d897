//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::menu::ProductView;
use crate::cart::SessionCart;
use crate::state::AppState;

/// Number of products shown on the home page.
const FEATURED_COUNT: usize = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductView>,
    pub cart_count: u32,
}

/// Display the home page.
#[instrument(skip(state, cart))]
pub async fn home(State(state): State<AppState>, cart: SessionCart) -> impl IntoResponse {
    let image_base = state.config().backend.base_url.as_str();
    let featured = match state.backend().list_products().await {
        Ok(products) => products
            .iter()
            .take(FEATURED_COUNT)
            .map(|product| ProductView::new(product, image_base))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        }
    };

    HomeTemplate {
        featured,
        cart_count: cart.total_items(),
    }
}
