//! Browser session middleware and extractor.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! cookie is the browser's durable storage for its [`SessionId`].

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use cornershop_core::SessionId;

use crate::config::StorefrontConfig;
use crate::error::{AppError, set_sentry_session};
use crate::session::get_or_create_session_id;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cs_session";

/// Session expiry time in seconds (one year of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The sessions table is created by `cs-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Extractor for the browser's cart session ID.
///
/// Creates and persists the ID on the browser's first request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(BrowserSession(session_id): BrowserSession) -> String {
///     session_id.to_string()
/// }
/// ```
pub struct BrowserSession(pub SessionId);

impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let session_id = get_or_create_session_id(&session).await?;
        set_sentry_session(&session_id);
        tracing::Span::current().record("session_id", session_id.as_str());

        Ok(Self(session_id))
    }
}
