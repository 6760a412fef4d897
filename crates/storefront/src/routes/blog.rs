//! Blog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use painboul_core::BlogPost;

use crate::cart::SessionCart;
use crate::state::AppState;

/// Blog page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub posts: Vec<BlogPost>,
    pub cart_count: u32,
}

/// Display blog posts. A backend failure renders the "no posts" state.
#[instrument(skip(state, cart))]
pub async fn index(State(state): State<AppState>, cart: SessionCart) -> impl IntoResponse {
    let posts = state.backend().list_blog_posts().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load blog posts");
        Vec::new()
    });

    BlogTemplate {
        posts,
        cart_count: cart.total_items(),
    }
}
