//! Core traits for storage abstraction
//!
//! The Storage trait lets the frame machinery and the engine run against any
//! ordered key-value backend without knowing how it is implemented.

use crate::error::Result;
use crate::types::Key;

/// Storage abstraction for committed contract state
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait Storage: Send + Sync {
    /// Get the committed bytes for a key
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>>;

    /// Scan committed keys starting with `prefix` (see [`Key::starts_with`])
    ///
    /// Results are sorted by key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scan_prefix(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>>;

    /// Apply a batch of writes and deletes atomically
    ///
    /// Returns the version assigned to the batch. No reader may observe a
    /// partially applied batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails; in that case nothing
    /// from the batch is applied.
    fn apply_batch(&self, writes: Vec<(Key, Vec<u8>)>, deletes: Vec<Key>) -> Result<u64>;

    /// Highest version assigned so far (0 before the first batch)
    fn current_version(&self) -> u64;
}
