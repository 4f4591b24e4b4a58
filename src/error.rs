//! Error types for table construction and fallible growth.

use std::collections::TryReserveError;
use thiserror::Error;

/// Rejected `TableConfig`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("initial capacity must be at least one bucket")]
    ZeroCapacity,
    #[error("load factor threshold must be in (0, 1], got {0}")]
    InvalidLoadFactor(f64),
}

/// Failure of an operation that would otherwise abort on out-of-memory.
///
/// The table is left exactly as it was before the call.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to allocate bucket array: {0}")]
    AllocationFailed(#[from] TryReserveError),
}
