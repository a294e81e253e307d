//! Dataset profiling: type inference, column statistics, correlation,
//! chart suggestions and the assembler that ties them together.
//!
//! Everything in here is synchronous and free of I/O. A call gets its own
//! rows and returns a fresh value, so independent datasets can be profiled
//! from any number of threads without coordination.

pub mod assembler;
pub mod correlation;
pub mod errors;
pub mod inference;
pub mod stats;
pub mod suggestions;
pub mod values;

pub use assembler::{assemble, assemble_with_schema};
pub use correlation::{correlation, detect_relationships};
pub use errors::{ProfileError, ProfileResult};
pub use inference::infer_column_type;
pub use stats::compute_stats;
pub use suggestions::suggest_chart_types;
