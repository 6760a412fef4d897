//! Product management handlers.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use painboul_core::{Category, Price, Product, ProductId, ProductInput};

use super::dashboard::AdminUserView;
use super::notice_message;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Largest image the dashboard accepts.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for the product form: the image plus the text fields.
pub const FORM_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Product row for the listing.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl ProductRow {
    fn new(product: &Product, image_base: &str) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            price: product.unit_price().display(),
            category: product.category_name.clone().unwrap_or_default(),
            image_url: product.image_url(image_base),
        }
    }
}

/// Product create/edit form text fields.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub category_name: String,
}

impl ProductForm {
    /// Prefill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.unit_price().amount().normalize().to_string(),
            image_url: product.image.clone().unwrap_or_default(),
            category_name: product.category_name.clone().unwrap_or_default(),
        }
    }

    /// Validate into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns a message for the form when the name is blank or the price is
    /// not a non-negative number.
    pub fn to_input(&self) -> std::result::Result<ProductInput, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required.");
        }
        let price = Decimal::from_str(self.price.trim()).map_err(|_| "Price must be a number.")?;
        if price.is_sign_negative() {
            return Err("Price cannot be negative.");
        }
        if self.category_name.trim().is_empty() {
            return Err("Choose a category.");
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Ok(ProductInput {
            name: name.to_string(),
            price: Price::new(price),
            image: optional(&self.image_url),
            category_name: optional(&self.category_name),
        })
    }
}

/// Image file chosen in the product form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check the file is an image of an acceptable size.
    ///
    /// # Errors
    ///
    /// Returns a message for the form otherwise.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if !self.content_type.starts_with("image/") {
            return Err("The file must be an image.");
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err("Images must be 10 MB or smaller.");
        }
        Ok(())
    }
}

/// Product form as posted: text fields plus an optional image file.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub form: ProductForm,
    pub image: Option<ImageUpload>,
}

impl ProductSubmission {
    /// Read the multipart body into `self`, keeping the fields read so far
    /// when the body turns out to be malformed or too large.
    async fn read(&mut self, multipart: &mut Multipart) -> std::result::Result<(), MultipartError> {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // An untouched file input still posts an empty part
                if !bytes.is_empty() {
                    self.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "name" => self.form.name = value,
                "price" => self.form.price = value,
                "image_url" => self.form.image_url = value,
                "category_name" => self.form.category_name = value,
                _ => {}
            }
        }
        Ok(())
    }
}

/// A submit that cannot go to the backend, with what to re-render.
struct Rejected {
    form: ProductForm,
    status: StatusCode,
    message: &'static str,
}

/// Read the posted form, upload the chosen image, and build the payload.
///
/// The text fields are validated before anything is uploaded. An uploaded
/// image replaces the typed image path.
async fn submitted_input(
    state: &AppState,
    mut multipart: Multipart,
) -> std::result::Result<(ProductForm, ProductInput), Rejected> {
    let mut submission = ProductSubmission::default();
    if let Err(e) = submission.read(&mut multipart).await {
        tracing::warn!(error = %e, "Failed to read product form");
        return Err(Rejected {
            form: submission.form,
            status: e.status(),
            message: "The form could not be read. Images must be 10 MB or smaller.",
        });
    }
    let ProductSubmission { mut form, image } = submission;

    let mut input = match form.to_input() {
        Ok(input) => input,
        Err(message) => {
            return Err(Rejected {
                form,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
            });
        }
    };

    if let Some(image) = image {
        if let Err(message) = image.validate() {
            return Err(Rejected {
                form,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
            });
        }
        match state
            .backend()
            .upload_image(&image.file_name, &image.content_type, image.bytes)
            .await
        {
            Ok(path) => {
                tracing::info!(path = %path, "Product image uploaded");
                form.image_url.clone_from(&path);
                input.image = Some(path);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to upload product image");
                return Err(Rejected {
                    form,
                    status: StatusCode::BAD_GATEWAY,
                    message: "The image could not be uploaded. Please try again.",
                });
            }
        }
    }

    Ok((form, input))
}

/// Query parameters for the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub notice: Option<String>,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub notice: Option<&'static str>,
    pub products: Vec<ProductRow>,
    pub load_failed: bool,
}

/// Product form template (create and edit).
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    /// `None` when creating.
    pub product_id: Option<i64>,
    pub form: ProductForm,
    pub categories: Vec<Category>,
    pub error: Option<&'static str>,
}

impl ProductFormTemplate {
    /// Form `action` attribute.
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .map_or_else(|| "/products".to_string(), |id| format!("/products/{id}"))
    }
}

async fn load_categories(state: &AppState) -> Vec<Category> {
    state.backend().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for product form");
        Vec::new()
    })
}

/// Product listing.
#[instrument(skip(admin, state, query))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let image_base = state.config().backend_url.as_str();
    let (products, load_failed) = match state.backend().list_products().await {
        Ok(products) => (
            products
                .iter()
                .map(|p| ProductRow::new(p, image_base))
                .collect(),
            false,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch products");
            (Vec::new(), true)
        }
    };

    ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        notice: notice_message(query.notice.as_deref()),
        products,
        load_failed,
    }
}

/// Empty create form.
#[instrument(skip(admin, state))]
pub async fn new_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        product_id: None,
        form: ProductForm::default(),
        categories: load_categories(&state).await,
        error: None,
    }
}

/// Edit form for an existing product.
#[instrument(skip(admin, state))]
pub async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let product = state.backend().get_product(ProductId::new(id)).await?;

    Ok(ProductFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        product_id: Some(id),
        form: ProductForm::from_product(&product),
        categories: load_categories(&state).await,
        error: None,
    })
}

/// Re-render the form with a message after a rejected submit.
async fn form_error(
    state: &AppState,
    admin: &crate::models::CurrentAdmin,
    product_id: Option<i64>,
    form: ProductForm,
    status: StatusCode,
    error: &'static str,
) -> Response {
    (
        status,
        ProductFormTemplate {
            admin_user: AdminUserView::from(admin),
            current_path: "/products".to_string(),
            product_id,
            form,
            categories: load_categories(state).await,
            error: Some(error),
        },
    )
        .into_response()
}

/// Create a product.
#[instrument(skip(admin, state, multipart))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let (form, input) = match submitted_input(&state, multipart).await {
        Ok(submitted) => submitted,
        Err(rejected) => {
            return form_error(
                &state,
                &admin,
                None,
                rejected.form,
                rejected.status,
                rejected.message,
            )
            .await;
        }
    };

    match state.backend().create_product(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Redirect::to("/products?notice=created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            form_error(
                &state,
                &admin,
                None,
                form,
                StatusCode::BAD_GATEWAY,
                "The bakery backend did not accept the product. Please try again.",
            )
            .await
        }
    }
}

/// Update a product.
#[instrument(skip(admin, state, multipart))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let (form, input) = match submitted_input(&state, multipart).await {
        Ok(submitted) => submitted,
        Err(rejected) => {
            return form_error(
                &state,
                &admin,
                Some(id),
                rejected.form,
                rejected.status,
                rejected.message,
            )
            .await;
        }
    };

    match state.backend().update_product(ProductId::new(id), &input).await {
        Ok(_) => Redirect::to("/products?notice=updated").into_response(),
        Err(e) if e.is_not_found() => Redirect::to("/products?notice=already_deleted").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update product");
            form_error(
                &state,
                &admin,
                Some(id),
                form,
                StatusCode::BAD_GATEWAY,
                "The bakery backend did not accept the changes. Please try again.",
            )
            .await
        }
    }
}

/// Delete a product.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Redirect {
    match state.backend().delete_product(ProductId::new(id)).await {
        Ok(()) => Redirect::to("/products?notice=deleted"),
        Err(e) if e.is_not_found() => Redirect::to("/products?notice=already_deleted"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete product");
            Redirect::to("/products?notice=failed")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            price: price.to_string(),
            image_url: "  ".to_string(),
            category_name: "Pains".to_string(),
        }
    }

    #[test]
    fn test_to_input_trims_and_drops_blank_image() {
        let input = form("  Baguette ", "1500").to_input().unwrap();
        assert_eq!(input.name, "Baguette");
        assert_eq!(input.price, Price::from_ariary(1500));
        assert_eq!(input.image, None);
        assert_eq!(input.category_name.as_deref(), Some("Pains"));
    }

    #[test]
    fn test_to_input_rejects_bad_values() {
        assert!(form("", "1500").to_input().is_err());
        assert!(form("Baguette", "cheap").to_input().is_err());
        assert!(form("Baguette", "-5").to_input().is_err());

        let mut uncategorized = form("Baguette", "1500");
        uncategorized.category_name = " ".to_string();
        assert_eq!(uncategorized.to_input(), Err("Choose a category."));
    }

    fn upload(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "baguette.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_image_upload_validation() {
        assert!(upload("image/jpeg", 2048).validate().is_ok());
        assert!(upload("image/png", MAX_IMAGE_BYTES).validate().is_ok());
        assert_eq!(
            upload("application/pdf", 2048).validate(),
            Err("The file must be an image.")
        );
        assert_eq!(
            upload("image/jpeg", MAX_IMAGE_BYTES + 1).validate(),
            Err("Images must be 10 MB or smaller.")
        );
    }

    #[test]
    fn test_from_product_prefills_fields() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "idProduct": 4,
            "name": "Croissant",
            "price": 4000.0,
            "categoryName": "Viennoiseries"
        }))
        .unwrap();
        let prefilled = ProductForm::from_product(&product);
        assert_eq!(prefilled.price, "4000");
        assert_eq!(prefilled.category_name, "Viennoiseries");
    }

    #[test]
    fn test_form_action_depends_on_mode() {
        let admin_user = AdminUserView {
            email: "owner@painboule.mg".to_string(),
            role: "owner".to_string(),
        };
        let mut template = ProductFormTemplate {
            admin_user,
            current_path: "/products".to_string(),
            product_id: None,
            form: ProductForm::default(),
            categories: Vec::new(),
            error: None,
        };
        assert_eq!(template.action(), "/products");
        template.product_id = Some(12);
        assert_eq!(template.action(), "/products/12");
    }
}
