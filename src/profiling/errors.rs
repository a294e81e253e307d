use thiserror::Error;

pub type ProfileResult<T> = Result<T, ProfileError>;

/// Failures of a single profiling call. Other datasets are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No rows were supplied, so there are no column names to discover.
    #[error("No data to profile")]
    EmptyData,
}
