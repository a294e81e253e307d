//! Query-result sources.
//!
//! Results are fetched by the host's warehouse client. This module hands the
//! host the preview query to run and profiles the result set it posts back
//! against its declared schema.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Dataset, Row, TableSchema};
use crate::profiling::assemble_with_schema;

pub const DEFAULT_PREVIEW_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigQueryTable {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl BigQueryTable {
    /// Rejects empty identifiers and ones that would break out of the quoted
    /// table path.
    pub fn validate(&self) -> Result<(), AppError> {
        let parts = [
            ("project_id", &self.project_id),
            ("dataset_id", &self.dataset_id),
            ("table_id", &self.table_id),
        ];
        for (field, value) in parts {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
            }
            if value.contains('`') || value.contains('.') {
                return Err(AppError::InvalidInput(format!("{} contains an invalid character", field)));
            }
        }
        Ok(())
    }
}

/// `SELECT *` over a fully qualified table, capped at `limit` rows.
pub fn build_preview_query(table: &BigQueryTable, limit: usize) -> String {
    format!(
        "SELECT * FROM `{}.{}.{}` LIMIT {}",
        table.project_id, table.dataset_id, table.table_id, limit
    )
}

/// Profiles a query result set using the schema the warehouse reported.
///
/// # Errors
///
/// [`AppError::Profile`] when the result set has no rows.
pub fn dataset_from_query_result(
    id: &str,
    name: &str,
    source_id: &str,
    rows: Vec<Row>,
    schema: &TableSchema,
) -> Result<Dataset, AppError> {
    tracing::info!(
        "Profiling query result {}: {} rows, {} declared fields",
        name,
        rows.len(),
        schema.fields.len()
    );
    Ok(assemble_with_schema(id, name, source_id, rows, schema)?)
}
