use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::error::AppError;
use crate::models::Row;
use crate::services::utils::unique_headers;

use super::utils::{cell_to_scalar, is_blank};

/// Data rows of one worksheet.
#[derive(Debug, Clone)]
pub struct SheetRows {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Turns a worksheet's cells into rows keyed by its header.
///
/// The first row with any content is the header. Rows whose cells are all
/// blank are dropped; missing trailing cells read as null.
pub fn rows_from_cells<'a, I>(cells: I) -> Vec<Row>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut cells = cells.into_iter().filter(|row| !row.iter().all(is_blank));

    let headers = match cells.next() {
        Some(header_row) => {
            let names: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
            unique_headers(names.iter().map(String::as_str))
        }
        None => return Vec::new(),
    };

    cells
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = row.get(idx).map(cell_to_scalar).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Reads every worksheet of an XLSX workbook.
///
/// Sheets without data rows are skipped.
///
/// # Errors
///
/// The bytes are not a readable workbook, or no sheet holds any data.
pub fn read_workbook(file_data: Bytes) -> Result<Vec<SheetRows>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Opening workbook ({}KB)...", file_data.len() / 1024);

    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open Excel file: {}", e);
        AppError::from(e)
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    tracing::info!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let mut sheets = Vec::new();
    for (name, range) in workbook.worksheets() {
        let rows = rows_from_cells(range.rows());
        if rows.is_empty() {
            tracing::warn!("Sheet {} has no data rows, skipping", name);
            continue;
        }
        tracing::info!("Read sheet {}: {} rows", name, rows.len());
        sheets.push(SheetRows { name, rows });
    }

    if sheets.is_empty() {
        return Err(AppError::InvalidInput("No data found in Excel file".to_string()));
    }

    tracing::info!("Workbook read in {:?}", start.elapsed());
    Ok(sheets)
}
