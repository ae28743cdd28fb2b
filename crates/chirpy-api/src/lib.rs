pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod tokens;
pub mod users;
pub mod validate;
pub mod webhooks;

use tracing::error;

use crate::error::ApiError;

/// Run store or hashing work on the blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
