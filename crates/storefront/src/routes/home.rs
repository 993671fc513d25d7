//! Storefront page and product grid handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{Catalog, CategoryFilter};
use crate::middleware::BrowserSession;
use crate::models::Product;
use crate::routes::cart::{CartView, drain};
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub category: String,
}

impl ProductCardView {
    fn new(product: &Product, catalog: &Catalog) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: product.price.display(),
            category: catalog.category_name(product).to_string(),
        }
    }
}

/// Product cards for a filter, in catalog order.
fn product_cards(catalog: &Catalog, filter: &CategoryFilter) -> Vec<ProductCardView> {
    catalog
        .filter(filter)
        .into_iter()
        .map(|p| ProductCardView::new(p, catalog))
        .collect()
}

/// Category navigation query.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

impl CategoryQuery {
    fn filter(&self) -> CategoryFilter {
        self.category
            .as_deref()
            .unwrap_or_default()
            .parse()
            .unwrap_or_default()
    }
}

/// Storefront page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub categories: Vec<String>,
    pub current_category: String,
    pub products: Vec<ProductCardView>,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/products_grid.html")]
pub struct ProductsGridTemplate {
    pub products: Vec<ProductCardView>,
}

/// Display the storefront page.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog().await;
    let filter = query.filter();

    let cart = state.cart(&session_id).await;
    let (cart, error) = drain(&mut *cart.lock().await);

    IndexTemplate {
        categories: catalog.categories().iter().map(|c| c.name.clone()).collect(),
        current_category: filter.key().to_string(),
        products: product_cards(&catalog, &filter),
        cart,
        error,
    }
}

/// Product grid for a category (HTMX).
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog().await;
    ProductsGridTemplate {
        products: product_cards(&catalog, &query.filter()),
    }
}
