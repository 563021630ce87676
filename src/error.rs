use thiserror::Error;

/// Construction failures. Lookups and removals of missing keys are not
/// errors; they report absence through `Option`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,
}
