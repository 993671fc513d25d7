//! Session identity provider.
//!
//! Each browser gets one opaque [`SessionId`] the first time it visits. The
//! ID is written to durable client storage under [`SESSION_ID_KEY`] and
//! returned unchanged on every later visit. It scopes which `cart_items`
//! rows belong to the browser.

use std::future::Future;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use cornershop_core::SessionId;

/// Storage key holding the session ID.
pub const SESSION_ID_KEY: &str = "session_id";

/// Length of the random suffix of a generated session ID.
const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Errors from the durable client storage.
///
/// Storage is a precondition for the whole storefront; callers surface this
/// as an internal error rather than recovering.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(String),
}

/// Durable key-value storage scoped to one browser.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, SessionError>> + Send;

    /// Write a value.
    fn write(&self, key: &str, value: &str) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// Browser sessions managed by `tower-sessions` (cookie plus `PostgreSQL`).
impl SessionStorage for tower_sessions::Session {
    async fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.get::<String>(key)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.insert(key, value)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }
}

/// Return the browser's session ID, creating and persisting one on first use.
///
/// # Errors
///
/// Returns [`SessionError::Storage`] if the storage cannot be read or written.
pub async fn get_or_create_session_id<S: SessionStorage>(
    storage: &S,
) -> Result<SessionId, SessionError> {
    if let Some(existing) = storage.read(SESSION_ID_KEY).await?
        && !existing.is_empty()
    {
        return Ok(SessionId::new(existing));
    }

    let id = generate_session_id();
    storage.write(SESSION_ID_KEY, id.as_str()).await?;
    info!(session_id = %id, "created browser session");
    Ok(id)
}

/// Generate `session_<unix millis>_<9 base36 chars>`.
#[must_use]
pub fn generate_session_id() -> SessionId {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..BASE36.len());
            char::from(BASE36.get(idx).copied().unwrap_or(b'0'))
        })
        .collect();
    SessionId::new(format!("session_{millis}_{suffix}"))
}
