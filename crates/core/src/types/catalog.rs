//! Catalog records served by the backend: products, categories, blog posts.

use serde::{Deserialize, Serialize};

use super::id::{BlogPostId, CategoryId, ProductId};
use super::price::Price;

/// A product on the menu.
///
/// Field names follow the backend's JSON (`idProduct`, `categoryName`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "idProduct")]
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Missing prices count as zero in cart totals.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        rename = "idCategory",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl Product {
    /// Price used for arithmetic, zero when the backend sent none.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    /// Whether this product belongs to the given category.
    ///
    /// Matches on the category name, ignoring case, falling back to the
    /// category id when the backend omitted the name.
    #[must_use]
    pub fn belongs_to(&self, category: &Category) -> bool {
        match &self.category_name {
            Some(name) => name.trim().eq_ignore_ascii_case(category.name.trim()),
            None => self.category_id == Some(category.id),
        }
    }

    /// Absolute image URL, resolving backend-relative paths against `base`.
    #[must_use]
    pub fn image_url(&self, base: &str) -> Option<String> {
        let image = self.image.as_deref().filter(|s| !s.trim().is_empty())?;
        if image.starts_with("http://") || image.starts_with("https://") {
            Some(image.to_string())
        } else {
            Some(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                image.trim_start_matches('/')
            ))
        }
    }
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: CategoryId,
    #[serde(rename = "nameCategory")]
    pub name: String,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Payload for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    #[serde(rename = "nameCategory")]
    pub name: String,
}

/// A blog post summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn croissant() -> Product {
        serde_json::from_str(
            r#"{"idProduct":7,"name":"Croissant","price":4000,"image":"/uploads/croissant.jpg","categoryName":"Viennoiseries"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_product_from_backend_json() {
        let product = croissant();
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.unit_price(), Price::from_ariary(4000));
        assert_eq!(product.category_id, None);
    }

    #[test]
    fn test_missing_price_is_zero() {
        let product: Product = serde_json::from_str(r#"{"idProduct":3,"name":"Pain"}"#).unwrap();
        assert_eq!(product.price, None);
        assert_eq!(product.unit_price(), Price::ZERO);
    }

    #[test]
    fn test_belongs_to_ignores_case() {
        let category = Category {
            id: CategoryId::new(2),
            name: "viennoiseries".to_string(),
        };
        assert!(croissant().belongs_to(&category));

        let other = Category {
            id: CategoryId::new(3),
            name: "Gâteaux".to_string(),
        };
        assert!(!croissant().belongs_to(&other));
    }

    #[test]
    fn test_belongs_to_falls_back_to_id() {
        let mut product = croissant();
        product.category_name = None;
        product.category_id = Some(CategoryId::new(2));
        let category = Category {
            id: CategoryId::new(2),
            name: "Anything".to_string(),
        };
        assert!(product.belongs_to(&category));
    }

    #[test]
    fn test_image_url_resolution() {
        let product = croissant();
        assert_eq!(
            product.image_url("http://localhost:8080/").as_deref(),
            Some("http://localhost:8080/uploads/croissant.jpg")
        );

        let mut remote = croissant();
        remote.image = Some("https://cdn.example.com/c.jpg".to_string());
        assert_eq!(
            remote.image_url("http://localhost:8080").as_deref(),
            Some("https://cdn.example.com/c.jpg")
        );

        let mut none = croissant();
        none.image = Some("  ".to_string());
        assert_eq!(none.image_url("http://localhost:8080"), None);
    }

    #[test]
    fn test_category_wire_names() {
        let category: Category =
            serde_json::from_str(r#"{"idCategory":1,"nameCategory":"Pains"}"#).unwrap();
        assert_eq!(category.name, "Pains");
    }
}
