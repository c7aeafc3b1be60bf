//! Product detail route handlers.
//!
//! The page renders a loading placeholder straight away; HTMX then loads the
//! details fragment. If the product cannot be fetched the fragment is the
//! placeholder again, without a further request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use shopfront_core::ProductId;

use crate::catalog::Product;
use crate::controller::{DetailController, DetailState};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::CurrentUser;
use crate::models::UserProfile;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub brand: Option<String>,
    pub rating: Option<f64>,
    pub availability: Option<String>,
    pub image: Option<String>,
    pub gallery: Vec<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let image = product.card_image().map(String::from);
        Self {
            price: product.price.to_string(),
            title: product.title,
            description: product.description,
            category: product.category,
            brand: product.brand.filter(|b| !b.is_empty()),
            rating: product.rating,
            availability: product.stock.map(|stock| {
                if stock > 0 {
                    format!("{stock} in stock")
                } else {
                    "Out of stock".to_string()
                }
            }),
            image,
            gallery: product.images,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<UserProfile>,
    pub id: ProductId,
}

/// Loaded product fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_details.html")]
pub struct ProductDetailsTemplate {
    pub product: ProductView,
}

/// Placeholder fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_loading.html")]
pub struct ProductLoadingTemplate;

/// Display the product detail page shell.
pub async fn show(CurrentUser(user): CurrentUser, Path(id): Path<ProductId>) -> impl IntoResponse {
    add_breadcrumb(
        "navigation",
        "Viewed product page",
        Some(&[("product_id", &id.to_string())]),
    );
    ProductShowTemplate { user, id }
}

/// Load the product and render its details, or the placeholder on failure.
#[tracing::instrument(skip_all)]
pub async fn details(State(state): State<AppState>, Path(id): Path<ProductId>) -> Response {
    let controller = DetailController::new(state.catalog());

    match controller.show(id).await {
        DetailState::Loaded(product) => ProductDetailsTemplate {
            product: ProductView::from(*product),
        }
        .into_response(),
        DetailState::Loading => ProductLoadingTemplate.into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::Price;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(9),
            title: "Desk Lamp".to_string(),
            description: "Warm light".to_string(),
            price: Price::from_cents(2450),
            category: "lighting".to_string(),
            thumbnail: None,
            brand: Some(String::new()),
            rating: Some(4.5),
            stock: Some(3),
            discount_percentage: None,
            images: vec!["https://cdn.example.com/9.png".to_string()],
        }
    }

    #[test]
    fn test_product_view_from_product() {
        let view = ProductView::from(product());
        assert_eq!(view.price, "$24.50");
        assert_eq!(view.image.as_deref(), Some("https://cdn.example.com/9.png"));
        assert!(view.brand.is_none());
    }

    #[test]
    fn test_details_fragment_renders_fields() {
        let html = ProductDetailsTemplate {
            product: ProductView::from(product()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Desk Lamp"));
        assert!(html.contains("Warm light"));
        assert!(html.contains("$24.50"));
        assert!(html.contains("lighting"));
        assert!(html.contains("4.5 / 5"));
        assert!(html.contains("3 in stock"));
    }

    #[test]
    fn test_show_page_requests_details_on_load() {
        let html = ProductShowTemplate {
            user: None,
            id: ProductId::new(9),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"hx-get="/product/9/details""#));
        assert!(html.contains(r#"hx-trigger="load""#));
    }

    #[test]
    fn test_placeholder_fragment_does_not_refetch() {
        let html = ProductLoadingTemplate.render().unwrap();
        assert!(html.contains("Loading"));
        assert!(!html.contains("hx-get"));
    }
}
