//! Dashboard routes: aggregated statistics for the overview page.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::routes::blocking;
use crate::services::catalog;
use crate::services::dashboard::{self, DashboardStats};
use crate::AppState;

/// GET /api/v1/dashboard/stats: aggregated dashboard statistics.
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = blocking(move || {
        let table = catalog::current_table(&state.store, state.config.heal_schema_on_read);
        Ok(dashboard::get_stats(&table))
    })
    .await?;
    Ok(ApiResponse::success(stats))
}
