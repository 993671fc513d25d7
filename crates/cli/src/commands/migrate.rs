//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Storefront migrations live in `crates/storefront/migrations/` and are
//! embedded at compile time. The browser session table is owned by
//! `tower-sessions-sqlx-store` and created by its own migration.

use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use cornershop_storefront::db::create_pool;

use super::{CommandError, database_url};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!("Connecting to storefront database...");
    let pool = create_pool(&database_url).await?;

    info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Creating session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    info!("Storefront migrations complete!");
    Ok(())
}
