//! Builds a profiled [`Dataset`] from raw rows.
//!
//! A call either returns the complete dataset or fails before anything is
//! built; there is no partially profiled state.

use std::time::Instant;

use chrono::Utc;
use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::models::{default_original_type, Column, Dataset, Row, TableSchema};

use super::errors::{ProfileError, ProfileResult};
use super::inference::infer_column_type;
use super::stats::compute_stats;
use super::values::value_in;

/// Column names in first-seen order across all rows.
pub fn discover_columns(rows: &[Row]) -> Vec<String> {
    let names: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Infers the type of one column and computes its statistics.
fn profile_column(rows: &[Row], name: &str, original_type: String) -> Column {
    let values: Vec<_> = rows.iter().map(|row| value_in(row, name)).collect();
    let column_type = infer_column_type(values.iter().copied());
    let stats = compute_stats(values.iter().copied(), column_type);

    debug!(
        "Profiled column {}: type={}, nulls={}, unique={}",
        name, column_type, stats.null_count, stats.unique_count
    );

    Column {
        name: name.to_string(),
        column_type,
        original_type,
        nullable: stats.null_count > 0,
        unique: stats.unique_count == stats.count,
        stats,
    }
}

fn check_not_empty(rows: &[Row], name: &str) -> ProfileResult<()> {
    if rows.is_empty() {
        warn!("Refusing to profile dataset {} with no rows", name);
        return Err(ProfileError::EmptyData);
    }
    Ok(())
}

/// Profiles every column found in `rows`.
///
/// # Errors
///
/// [`ProfileError::EmptyData`] when `rows` is empty.
pub fn assemble(
    id: impl Into<String>,
    name: impl Into<String>,
    source_id: impl Into<String>,
    rows: Vec<Row>,
) -> ProfileResult<Dataset> {
    let name = name.into();
    check_not_empty(&rows, &name)?;

    let start = Instant::now();
    let columns: Vec<Column> = discover_columns(&rows)
        .iter()
        .map(|column| profile_column(&rows, column, default_original_type()))
        .collect();

    info!(
        "Profiled dataset {}: {} rows, {} columns in {:?}",
        name,
        rows.len(),
        columns.len(),
        start.elapsed()
    );

    Ok(Dataset::new(id.into(), name, source_id.into(), columns, rows, Utc::now()))
}

/// Profiles the fields declared by `schema`, in declared order.
///
/// Field types are kept as each column's original type, and nullability
/// follows the declared mode rather than the observed nulls.
///
/// # Errors
///
/// [`ProfileError::EmptyData`] when `rows` is empty.
pub fn assemble_with_schema(
    id: impl Into<String>,
    name: impl Into<String>,
    source_id: impl Into<String>,
    rows: Vec<Row>,
    schema: &TableSchema,
) -> ProfileResult<Dataset> {
    let name = name.into();
    check_not_empty(&rows, &name)?;

    let start = Instant::now();
    let columns: Vec<Column> = schema
        .fields
        .iter()
        .map(|field| Column {
            nullable: !field.is_required(),
            ..profile_column(&rows, &field.name, field.field_type.clone())
        })
        .collect();

    info!(
        "Profiled dataset {} against declared schema: {} rows, {} fields in {:?}",
        name,
        rows.len(),
        columns.len(),
        start.elapsed()
    );

    Ok(Dataset::new(id.into(), name, source_id.into(), columns, rows, Utc::now()))
}
