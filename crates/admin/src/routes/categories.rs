//! Category management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use painboul_core::{Category, CategoryId, CategoryInput};

use super::dashboard::AdminUserView;
use super::notice_message;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub notice: Option<&'static str>,
    pub categories: Vec<Category>,
    pub load_failed: bool,
}

/// Query parameters for the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub notice: Option<String>,
}

/// Create/rename form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

impl CategoryForm {
    /// Trimmed payload, or `None` for a blank name.
    #[must_use]
    pub fn to_input(&self) -> Option<CategoryInput> {
        let name = self.name.trim();
        (!name.is_empty()).then(|| CategoryInput {
            name: name.to_string(),
        })
    }
}

/// Category listing.
#[instrument(skip(admin, state, query))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let (categories, load_failed) = match state.backend().list_categories().await {
        Ok(categories) => (categories, false),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch categories");
            (Vec::new(), true)
        }
    };

    CategoriesIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        notice: notice_message(query.notice.as_deref()),
        categories,
        load_failed,
    }
}

/// Create a category.
#[instrument(skip(_admin, state, form))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let Some(input) = form.to_input() else {
        return Redirect::to("/categories?notice=invalid_name");
    };

    match state.backend().create_category(&input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            Redirect::to("/categories?notice=created")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create category");
            Redirect::to("/categories?notice=failed")
        }
    }
}

/// Rename a category.
#[instrument(skip(_admin, state, form))]
pub async fn rename(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let Some(input) = form.to_input() else {
        return Redirect::to("/categories?notice=invalid_name");
    };

    match state
        .backend()
        .update_category(CategoryId::new(id), &input)
        .await
    {
        Ok(_) => Redirect::to("/categories?notice=updated"),
        Err(e) if e.is_not_found() => Redirect::to("/categories?notice=already_deleted"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to rename category");
            Redirect::to("/categories?notice=failed")
        }
    }
}

/// Delete a category.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Redirect {
    match state.backend().delete_category(CategoryId::new(id)).await {
        Ok(()) => Redirect::to("/categories?notice=deleted"),
        Err(e) if e.is_not_found() => Redirect::to("/categories?notice=already_deleted"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete category");
            Redirect::to("/categories?notice=failed")
        }
    }
}
