//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler locks the session's live cart for the whole operation, runs
//! it through the synchronizer, then renders whatever the observer buffered.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cornershop_core::{CartLineId, ProductId, SessionId};

use crate::cart::{BufferedObserver, CartError, CartSynchronizer};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::BrowserSession;
use crate::models::{CartLine, CartSnapshot};
use crate::state::AppState;
use crate::store::PgStore;

/// HTMX event fired after the cart changes.
pub const CART_UPDATED: &str = "cart-updated";

pub(crate) type LiveCart = CartSynchronizer<PgStore, BufferedObserver>;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub price: String,
    pub quantity: u32,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.product.name.clone(),
            image_url: line.product.image_url.clone(),
            price: line.product.price.display(),
            quantity: line.quantity.get(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            items: snapshot.lines.iter().map(CartItemView::from).collect(),
            total: snapshot.total.display(),
            item_count: snapshot.item_count,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Form data for operations on one cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub cart_id: CartLineId,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
    pub error: Option<String>,
}

/// Render state after an operation: the buffered snapshot (or the current
/// one if nothing changed) and the first buffered failure message.
pub(crate) fn drain(cart: &mut LiveCart) -> (CartView, Option<String>) {
    let error = cart
        .observer_mut()
        .take_failures()
        .into_iter()
        .next()
        .map(|failure| failure.message);
    let snapshot = cart
        .observer_mut()
        .take_render()
        .unwrap_or_else(|| cart.snapshot());
    (CartView::from(&snapshot), error)
}

/// Display the cart items fragment.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> impl IntoResponse {
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;
    let (cart, error) = drain(&mut cart);
    CartItemsTemplate { cart, error }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
) -> impl IntoResponse {
    let cart = state.cart(&session_id).await;
    let count = cart.lock().await.snapshot().item_count;
    CartCountTemplate { count, error: None }
}

/// Add one unit of a product (HTMX).
///
/// Returns the cart count badge and triggers `cart-updated` so the cart
/// panel refreshes itself.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let product_id = form.product_id.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    let catalog = state.catalog().await;
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;

    let result = cart.add_one(&catalog, form.product_id).await;
    let (view, error) = drain(&mut cart);

    match result {
        Ok(()) => Ok((
            AppendHeaders([("HX-Trigger", CART_UPDATED)]),
            CartCountTemplate {
                count: view.item_count,
                error: None,
            },
        )
            .into_response()),
        Err(CartError::UnknownProduct(id)) => Err(AppError::NotFound(format!("product {id}"))),
        Err(_) => Ok(CartCountTemplate {
            count: view.item_count,
            error,
        }
        .into_response()),
    }
}

/// Increase a line's quantity by one (HTMX).
#[instrument(skip(state))]
pub async fn increase(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<CartLineForm>,
) -> Response {
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;
    let result = cart.increase(form.cart_id).await;
    finish_line_operation(&state, &session_id, &mut cart, result).await
}

/// Decrease a line's quantity by one, removing it at zero (HTMX).
#[instrument(skip(state))]
pub async fn decrease(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<CartLineForm>,
) -> Response {
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;
    let result = cart.decrease(form.cart_id).await;
    finish_line_operation(&state, &session_id, &mut cart, result).await
}

/// Remove a line (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<CartLineForm>,
) -> Response {
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;
    let result = cart.remove(form.cart_id).await;
    finish_line_operation(&state, &session_id, &mut cart, result).await
}

/// Cart items fragment after a line operation.
///
/// Unknown lines (a stale page) render the current cart unchanged. A line
/// the store no longer has evicts the live cart, and `cart-updated` makes
/// the page fetch the reloaded one.
async fn finish_line_operation(
    state: &AppState,
    session_id: &SessionId,
    cart: &mut LiveCart,
    result: Result<(), CartError>,
) -> Response {
    let (view, error) = drain(cart);
    if let Err(e) = &result {
        tracing::debug!(error = %e, "cart line operation not applied");
    }
    if needs_reload(&result) {
        state.evict_cart(session_id).await;
    }

    let template = CartItemsTemplate { cart: view, error };
    if result.is_ok() || needs_reload(&result) {
        (AppendHeaders([("HX-Trigger", CART_UPDATED)]), template).into_response()
    } else {
        template.into_response()
    }
}

/// Whether the live cart has drifted from the store and must be reloaded.
const fn needs_reload(result: &Result<(), CartError>) -> bool {
    matches!(result, Err(CartError::StaleLine(_)))
}
