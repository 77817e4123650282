//! Catalog workflow: the read path that persists schema migrations, the
//! add-tool path, and form options.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::tool::{
    PricingType, ToolRecord, CATEGORY_PLACEHOLDER, OTHER_OPTION, PRICING_PLACEHOLDER,
    UPLOADER_PLACEHOLDER,
};
use crate::services::validation::ToolSubmission;
use crate::store::{self, RecordStore};

/// Choices the add-tool form offers.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub categories: Vec<String>,
    pub pricing_types: Vec<PricingType>,
    pub contributors: Vec<String>,
    pub category_placeholder: &'static str,
    pub pricing_placeholder: &'static str,
    pub uploader_placeholder: &'static str,
    pub other_option: &'static str,
}

/// Current table, writing the canonical header back when the file is stale
/// and `heal_schema` is set.
pub fn current_table(store: &RecordStore, heal_schema: bool) -> Arc<Vec<ToolRecord>> {
    let snapshot = store.snapshot();
    if let Some(migration) = &snapshot.migration {
        if heal_schema {
            match store.save(&snapshot.table) {
                Ok(()) => tracing::info!(
                    path = %store.path().display(),
                    migration = %migration,
                    "Database schema updated"
                ),
                Err(e) => tracing::warn!(
                    path = %store.path().display(),
                    error = %e,
                    "Failed to persist schema migration"
                ),
            }
        } else {
            tracing::info!(
                path = %store.path().display(),
                migration = %migration,
                "Tools file uses an outdated layout; leaving it untouched"
            );
        }
    }
    snapshot.table
}

/// Validate a submission and append it to the store.
pub fn add_tool(store: &RecordStore, submission: ToolSubmission) -> Result<ToolRecord, AppError> {
    let tool = submission.into_new_tool()?;
    let record = store.add_entry(tool).map_err(|e| {
        if e.is_duplicate() {
            tracing::info!(error = %e, "Rejected duplicate tool");
        }
        AppError::from(e)
    })?;
    Ok(record)
}

/// Look up one tool by serial number.
pub fn find_by_serial(
    store: &RecordStore,
    heal_schema: bool,
    serial_number: u32,
) -> Result<ToolRecord, AppError> {
    current_table(store, heal_schema)
        .iter()
        .find(|r| r.serial_number == serial_number)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Tool #{serial_number} not found")))
}

/// Predefined categories plus those in use, sorted.
pub fn all_categories(store: &RecordStore, heal_schema: bool) -> BTreeSet<String> {
    store::all_categories(&current_table(store, heal_schema))
}

pub fn form_options(
    store: &RecordStore,
    heal_schema: bool,
    contributors: &[String],
) -> FormOptions {
    FormOptions {
        categories: all_categories(store, heal_schema).into_iter().collect(),
        pricing_types: PricingType::ALL.to_vec(),
        contributors: contributors.to_vec(),
        category_placeholder: CATEGORY_PLACEHOLDER,
        pricing_placeholder: PRICING_PLACEHOLDER,
        uploader_placeholder: UPLOADER_PLACEHOLDER,
        other_option: OTHER_OPTION,
    }
}
