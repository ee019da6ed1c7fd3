//! Storage-layer value wrapper
//!
//! Committed bytes together with the version of the batch that wrote them.

/// A committed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    bytes: Vec<u8>,
    version: u64,
}

impl StoredValue {
    /// Create a stored value written at `version`
    pub fn new(bytes: Vec<u8>, version: u64) -> Self {
        StoredValue { bytes, version }
    }

    /// Get the encoded bytes
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Version of the batch that last wrote this value
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}
