//! Ingestion collaborators: turn uploaded files and query results into the
//! row sets the profiling core consumes.

pub mod bigquery;
pub mod csv_reader;
pub mod excel;
pub mod utils;
