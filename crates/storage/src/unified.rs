//! UnifiedStore: in-memory storage backend with BTreeMap and version management
//!
//! This module implements the Storage trait using:
//! - `BTreeMap<Key, StoredValue>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for monotonically increasing batch versions
//! - A namespace index for contract-scoped dumps
//!
//! # Design Notes
//!
//! - **No version history**: each key stores only its latest value
//! - **Batch atomicity**: a batch is applied under one write lock acquisition,
//!   so readers never see half of an outer transaction

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use tessera_core::{Key, Name, Result, Storage};

use crate::index::NamespaceIndex;
use crate::stored_value::StoredValue;

/// Unified storage backend using BTreeMap with RwLock
///
/// The data map and the namespace index are updated together under their
/// write locks, always acquired in the order data → index.
#[derive(Debug)]
pub struct UnifiedStore {
    /// The main data store: ordered map from Key to StoredValue
    data: RwLock<BTreeMap<Key, StoredValue>>,
    /// Secondary index: Name → Keys for contract-scoped queries
    namespace_index: RwLock<NamespaceIndex>,
    /// Global version counter, bumped once per applied batch
    version: AtomicU64,
}

impl UnifiedStore {
    /// Create a new empty UnifiedStore
    ///
    /// Initial version is 0 (no writes have occurred).
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            namespace_index: RwLock::new(NamespaceIndex::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Number of committed keys across all namespaces
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when nothing has been committed
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// All committed entries of one namespace, in key order
    ///
    /// Uses the namespace index for O(namespace size) lookup.
    pub fn scan_namespace(&self, namespace: &Name) -> Vec<(Key, Vec<u8>)> {
        let data = self.data.read();
        let ns_idx = self.namespace_index.read();

        match ns_idx.get(namespace) {
            Some(keys) => keys
                .iter()
                .filter_map(|key| data.get(key).map(|sv| (key.clone(), sv.bytes().to_vec())))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Version of the batch that last wrote `key`
    pub fn version_of(&self, key: &Key) -> Option<u64> {
        self.data.read().get(key).map(StoredValue::version)
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for UnifiedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for UnifiedStore {
    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        let data = self.data.read();
        Ok(data.get(key).map(|sv| sv.bytes().to_vec()))
    }

    fn scan_prefix(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        let data = self.data.read();

        let results = data
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, sv)| (k.clone(), sv.bytes().to_vec()))
            .collect();

        Ok(results)
    }

    fn apply_batch(&self, writes: Vec<(Key, Vec<u8>)>, deletes: Vec<Key>) -> Result<u64> {
        // Acquire ALL locks ONCE for the entire batch
        let mut data = self.data.write();
        let mut ns_idx = self.namespace_index.write();

        let version = self.next_version();
        let (write_count, delete_count) = (writes.len(), deletes.len());

        for (key, bytes) in writes {
            ns_idx.insert(key.clone());
            data.insert(key, StoredValue::new(bytes, version));
        }

        for key in deletes {
            if data.remove(&key).is_some() {
                ns_idx.remove(&key);
            }
        }

        trace!(
            target: "tessera::storage",
            version,
            writes = write_count,
            deletes = delete_count,
            "Batch applied"
        );

        Ok(version)
    }

    fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
