//! Tool routes: gallery listing, lookup and submission.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::tool::ToolRecord;
use crate::routes::blocking;
use crate::services::browse::{self, ToolFilters, ToolListing};
use crate::services::catalog;
use crate::services::validation::ToolSubmission;
use crate::AppState;

/// Serial number taken from the `{serial}` path segment.
///
/// Malformed values are rejected as `VALIDATION_ERROR` in the usual envelope.
#[derive(Debug, Clone, Copy)]
pub struct SerialPath(pub u32);

impl FromRequestParts<AppState> for SerialPath {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(vec![e.body_text()]))?;

        raw.trim().parse::<u32>().map(SerialPath).map_err(|_| {
            AppError::Validation(vec![format!(
                "Serial number must be a non-negative whole number, got '{raw}'."
            )])
        })
    }
}

/// GET /api/v1/tools: gallery cards matching the search and filters.
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<ToolFilters>,
) -> Result<Json<ApiResponse<ToolListing>>, AppError> {
    let listing = blocking(move || {
        let table = catalog::current_table(&state.store, state.config.heal_schema_on_read);
        Ok(browse::list(&table, &filters))
    })
    .await?;
    Ok(ApiResponse::success(listing))
}

/// POST /api/v1/tools: validate and append a new tool.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ToolSubmission>,
) -> Result<Json<ApiResponse<ToolRecord>>, AppError> {
    let record = blocking(move || catalog::add_tool(&state.store, body)).await?;
    Ok(ApiResponse::success(record))
}

/// GET /api/v1/tools/{serial}: one tool by serial number.
pub async fn get_by_serial(
    State(state): State<AppState>,
    SerialPath(serial): SerialPath,
) -> Result<Json<ApiResponse<ToolRecord>>, AppError> {
    let record = blocking(move || {
        catalog::find_by_serial(&state.store, state.config.heal_schema_on_read, serial)
    })
    .await?;
    Ok(ApiResponse::success(record))
}
