//! TableConfig: initial bucket count and growth threshold.

use crate::error::ConfigError;

/// Number of buckets a default table starts with.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Ratio of entries to buckets above which an insert grows the table.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Construction parameters for `ChainedHashTable`.
///
/// ```
/// use chained_table::{ChainedHashTable, TableConfig};
///
/// let config = TableConfig::default()
///     .with_initial_capacity(4)
///     .with_load_factor(0.5);
/// let table: ChainedHashTable<u32, &str> = ChainedHashTable::with_config(config).unwrap();
/// assert_eq!(table.capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Checks `initial_capacity >= 1` and `0 < load_factor <= 1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        // Written so that NaN fails the check.
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }
}
