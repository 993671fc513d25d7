//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the storefront against it
//! cs-cli migrate
//! cargo run -p cornershop-storefront
//!
//! # Run the ignored tests
//! cargo test -p cornershop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `store_postgres` - `PgStore` and the cart synchronizer against `PostgreSQL`
//! - `storefront_http` - HTTP flow against a running storefront

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use cornershop_core::{Price, ProductId, SessionId};
use cornershop_storefront::db::{CatalogRepository, create_pool};

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Connect to the test database.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}

/// A session ID no other test run will use.
#[must_use]
pub fn unique_session() -> SessionId {
    SessionId::new(format!("session_test_{}", Uuid::new_v4().simple()))
}

/// Insert an uncategorized product with a unique name.
///
/// # Panics
///
/// Panics if the price is invalid or the insert fails.
#[allow(clippy::expect_used)]
pub async fn seed_product(pool: &PgPool, price: &str) -> ProductId {
    let price = Price::parse(price).expect("valid price");
    CatalogRepository::new(pool)
        .insert_product(
            &format!("Test product {}", Uuid::new_v4()),
            "integration test product",
            price,
            "",
            None,
        )
        .await
        .expect("Failed to insert product")
}
