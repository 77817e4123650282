//! CSV download of the whole catalogue.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;

use crate::errors::AppError;
use crate::routes::blocking;
use crate::services::{catalog, export};
use crate::AppState;

/// GET /api/v1/export: the full table as a CSV attachment.
pub async fn download(State(state): State<AppState>) -> Result<Response, AppError> {
    let csv = blocking(move || {
        let table = catalog::current_table(&state.store, state.config.heal_schema_on_read);
        export::export_csv(&table, Local::now().naive_local())
    })
    .await?;

    tracing::info!(filename = %csv.filename, bytes = csv.content.len(), "Generated CSV export");

    let disposition = format!("attachment; filename=\"{}\"", csv.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.content,
    )
        .into_response())
}
