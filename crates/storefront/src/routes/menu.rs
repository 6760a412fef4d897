//! Menu page: every category with its products.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use painboul_core::{Category, Product};

use crate::cart::SessionCart;
use crate::state::AppState;

/// Heading for products whose category matches nothing.
pub const UNCATEGORIZED: &str = "Other";

/// Product display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, image_base: &str) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.unit_price().display(),
            image_url: product.image_url(image_base),
        }
    }
}

/// One category heading and its products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub name: String,
    pub products: Vec<ProductView>,
}

/// Group products under their categories, in category order.
///
/// Categories with no products are left out. Products that match no category
/// end up in a trailing [`UNCATEGORIZED`] section.
#[must_use]
pub fn group_by_category(
    categories: &[Category],
    products: &[Product],
    image_base: &str,
) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = categories
        .iter()
        .map(|category| MenuSection {
            name: category.name.clone(),
            products: products
                .iter()
                .filter(|product| product.belongs_to(category))
                .map(|product| ProductView::new(product, image_base))
                .collect(),
        })
        .filter(|section| !section.products.is_empty())
        .collect();

    let leftovers: Vec<ProductView> = products
        .iter()
        .filter(|product| !categories.iter().any(|c| product.belongs_to(c)))
        .map(|product| ProductView::new(product, image_base))
        .collect();
    if !leftovers.is_empty() {
        sections.push(MenuSection {
            name: UNCATEGORIZED.to_string(),
            products: leftovers,
        });
    }

    sections
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub sections: Vec<MenuSection>,
    pub cart_count: u32,
}

/// Display the menu.
///
/// Categories and products are fetched together; a failure of either
/// renders an empty menu.
#[instrument(skip(state, cart))]
pub async fn menu(State(state): State<AppState>, cart: SessionCart) -> impl IntoResponse {
    let backend = state.backend();
    let (categories, products) =
        tokio::join!(backend.list_categories(), backend.list_products());

    let sections = match (categories, products) {
        (Ok(categories), Ok(products)) => group_by_category(
            &categories,
            &products,
            state.config().backend.base_url.as_str(),
        ),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Failed to load menu");
            Vec::new()
        }
    };

    MenuTemplate {
        sections,
        cart_count: cart.total_items(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use painboul_core::{CategoryId, Price, ProductId};

    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
        }
    }

    fn product(id: i64, name: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: None,
            price: Some(Price::from_ariary(1000)),
            image: None,
            category_id: None,
            category_name: Some(category.to_string()),
        }
    }

    #[test]
    fn test_groups_by_case_insensitive_name() {
        let categories = vec![category(1, "Pains"), category(2, "Viennoiseries")];
        let products = vec![
            product(1, "Baguette", "pains"),
            product(2, "Croissant", "VIENNOISERIES"),
            product(3, "Pain complet", "Pains"),
        ];

        let sections = group_by_category(&categories, &products, "http://localhost:8080");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "Pains");
        assert_eq!(sections[0].products.len(), 2);
        assert_eq!(sections[1].products[0].name, "Croissant");
    }

    #[test]
    fn test_empty_categories_are_hidden() {
        let categories = vec![category(1, "Pains"), category(2, "Gâteaux")];
        let products = vec![product(1, "Baguette", "Pains")];

        let sections = group_by_category(&categories, &products, "");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Pains");
    }

    #[test]
    fn test_unmatched_products_go_to_other() {
        let categories = vec![category(1, "Pains")];
        let products = vec![
            product(1, "Baguette", "Pains"),
            product(2, "Mystère", "Saisonnier"),
        ];

        let sections = group_by_category(&categories, &products, "");
        assert_eq!(sections.last().unwrap().name, UNCATEGORIZED);
        assert_eq!(sections.last().unwrap().products[0].name, "Mystère");
    }

    #[test]
    fn test_product_view_formats_price() {
        let view = ProductView::new(&product(1, "Baguette", "Pains"), "");
        assert_eq!(view.price, "1000 Ar");
        assert_eq!(view.image_url, None);
    }
}
