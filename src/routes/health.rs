//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub store: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks that the tools file exists or can be created.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let store = state.store.clone();
    let store_status = match tokio::task::spawn_blocking(move || store.initialize()).await {
        Ok(Ok(())) => "available".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Tools file health check failed");
            format!("error: {e}")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Tools file health check task failed");
            format!("error: {e}")
        }
    };

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        store: store_status,
    })
}
