//! Route definitions for the tools catalogue API.

pub mod dashboard;
pub mod export;
pub mod health;
pub mod options;
pub mod tools;

use axum::routing::get;
use axum::Router;

use crate::errors::AppError;
use crate::AppState;

/// Build the API router. Middleware layers are added by the caller.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tools", get(tools::list).post(tools::create))
        .route("/tools/{serial}", get(tools::get_by_serial))
        .route("/categories", get(options::categories))
        .route("/form-options", get(options::form_options))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/export", get(export::download));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Run synchronous store work on the blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {e}")))?
}
