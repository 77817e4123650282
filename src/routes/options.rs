//! Category and form option routes.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::routes::blocking;
use crate::services::catalog::{self, FormOptions};
use crate::AppState;

/// GET /api/v1/categories: predefined and in-use categories, sorted.
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let categories = blocking(move || {
        let categories = catalog::all_categories(&state.store, state.config.heal_schema_on_read);
        Ok(categories.into_iter().collect())
    })
    .await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/v1/form-options: everything the add-tool form needs.
pub async fn form_options(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FormOptions>>, AppError> {
    let options = blocking(move || {
        Ok(catalog::form_options(
            &state.store,
            state.config.heal_schema_on_read,
            &state.config.contributors,
        ))
    })
    .await?;
    Ok(ApiResponse::success(options))
}
