//! Whole-table CSV export.

use chrono::NaiveDateTime;

use crate::errors::AppError;
use crate::models::tool::ToolRecord;
use crate::store::{codec, StoreError};

/// A generated export file.
#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Export filename for a generation time.
pub fn export_filename(generated_at: NaiveDateTime) -> String {
    format!(
        "ai_marketing_arsenal_data_{}.csv",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Render the table in the canonical column order.
pub fn export_csv(records: &[ToolRecord], generated_at: NaiveDateTime) -> Result<CsvExport, AppError> {
    if records.is_empty() {
        return Err(AppError::NotFound(
            "The catalogue is empty; there is no data to download yet".to_string(),
        ));
    }

    let mut content = Vec::new();
    codec::write_records(&mut content, records).map_err(StoreError::from)?;

    Ok(CsvExport {
        filename: export_filename(generated_at),
        content,
    })
}
