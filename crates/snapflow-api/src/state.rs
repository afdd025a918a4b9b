use std::sync::Arc;

use tracing::error;

use snapflow_db::Database;
use snapflow_media::MediaStore;

use crate::error::ApiError;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler may touch. Built once at startup and handed to the
/// router; nothing here is a global.
pub struct AppStateInner {
    pub db: Database,
    pub media: Arc<dyn MediaStore>,
    pub tokens: TokenService,
}

/// Run a blocking document-store call off the async runtime.
pub async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::Store)
}
