//! Checkout handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::cart::OrderError;
use crate::middleware::BrowserSession;
use crate::models::CustomerDetails;
use crate::routes::cart::{CART_UPDATED, drain};
use crate::state::AppState;

/// Message shown whenever an order could not be placed.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order. Please try again.";

/// Checkout form data.
///
/// Fields are stored as entered.
#[derive(Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_address: String,
}

impl std::fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutForm").finish_non_exhaustive()
    }
}

impl From<CheckoutForm> for CustomerDetails {
    fn from(form: CheckoutForm) -> Self {
        Self {
            name: form.customer_name,
            email: form.customer_email,
            address: form.customer_address,
        }
    }
}

/// Order placed fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_success.html")]
pub struct OrderSuccessTemplate {
    pub order_id: String,
    pub total: String,
}

/// Order failed fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_failed.html")]
pub struct OrderFailedTemplate {
    pub message: String,
}

/// Place an order from the session's cart.
#[instrument(skip(state))]
pub async fn place_order(
    State(state): State<AppState>,
    BrowserSession(session_id): BrowserSession,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let cart = state.cart(&session_id).await;
    let mut cart = cart.lock().await;
    let total = cart.snapshot().total.display();

    let result = cart.checkout(form.into()).await;
    // The order fragment replaces the cart panel; cart-updated refreshes it.
    drain(&mut cart);

    match result {
        Ok(order_id) => (
            AppendHeaders([("HX-Trigger", CART_UPDATED)]),
            OrderSuccessTemplate {
                order_id: order_id.to_string(),
                total,
            },
        )
            .into_response(),
        Err(OrderError::EmptyCart) => OrderFailedTemplate {
            message: "Your cart is empty.".to_string(),
        }
        .into_response(),
        Err(e) => {
            if let OrderError::ItemsFailed { order_id, .. } = &e {
                tracing::warn!(order_id = %order_id, "order left without items");
            }
            OrderFailedTemplate {
                message: ORDER_FAILED_MESSAGE.to_string(),
            }
            .into_response()
        }
    }
}
