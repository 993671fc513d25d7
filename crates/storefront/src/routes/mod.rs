//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Storefront page (?category=<name>|all)
//! GET  /products               - Product grid fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart items fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add one unit (returns badge, triggers cart-updated)
//! POST /cart/increase          - Increase quantity (returns cart_items fragment)
//! POST /cart/decrease          - Decrease quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//!
//! # Checkout
//! POST /checkout               - Place order (returns success or failure fragment)
//! ```

pub mod cart;
pub mod checkout;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(home::products))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::place_order))
}
