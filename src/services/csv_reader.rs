//! CSV uploads: header row plus dynamically typed records.

use csv::{ReaderBuilder, StringRecord};

use crate::error::AppError;
use crate::models::{Row, ScalarValue};

use super::utils::unique_headers;

/// Reads a typed value out of a raw CSV field.
///
/// Empty fields are null, `true`/`false` in any case are booleans, finite
/// numbers are numbers and anything else stays text.
pub fn typed_field(raw: &str) -> ScalarValue {
    if raw.is_empty() {
        return ScalarValue::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        return ScalarValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ScalarValue::Bool(false);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => ScalarValue::Number(n),
        _ => ScalarValue::String(raw.to_string()),
    }
}

fn record_to_row(headers: &[String], record: &StringRecord) -> Row {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let value = record.get(idx).map(typed_field).unwrap_or_default();
            (header.clone(), value)
        })
        .collect()
}

/// Parses a CSV document into rows keyed by its header.
///
/// Short records are padded with nulls, fields past the header are dropped
/// and records whose fields are all empty are skipped.
///
/// # Errors
///
/// Malformed CSV (for example invalid UTF-8) or a missing header row.
pub fn read_csv(data: &[u8]) -> Result<Vec<Row>, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = unique_headers(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(AppError::InvalidInput("CSV file has no header row".to_string()));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            skipped += 1;
            continue;
        }
        rows.push(record_to_row(&headers, &record));
    }

    tracing::info!(
        "Read {} CSV records across {} columns ({} blank records skipped)",
        rows.len(),
        headers.len(),
        skipped
    );
    Ok(rows)
}
