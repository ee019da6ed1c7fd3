//! Namespace index for contract-scoped queries
//!
//! Maps each contract namespace to the set of keys it owns, so that dumping
//! or counting one contract's state is O(contract size) instead of a scan
//! of the whole store.

use std::collections::{BTreeSet, HashMap};
use tessera_core::{Key, Name};

/// Secondary index: Name → Keys
#[derive(Debug, Default)]
pub struct NamespaceIndex {
    index: HashMap<Name, BTreeSet<Key>>,
}

impl NamespaceIndex {
    /// Create a new empty NamespaceIndex
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    /// Add key to its namespace's set
    pub fn insert(&mut self, key: Key) {
        self.index
            .entry(key.namespace.clone())
            .or_default()
            .insert(key);
    }

    /// Remove key from its namespace's set
    ///
    /// If the set becomes empty, removes the namespace entry entirely
    /// to avoid accumulating empty sets.
    pub fn remove(&mut self, key: &Key) {
        if let Some(keys) = self.index.get_mut(&key.namespace) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(&key.namespace);
            }
        }
    }

    /// All keys owned by a namespace, in key order
    pub fn get(&self, namespace: &Name) -> Option<&BTreeSet<Key>> {
        self.index.get(namespace)
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of namespaces holding at least one key
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut index = NamespaceIndex::new();
        let ns = Name::new("hello");
        let key1 = Key::primary(ns.clone(), "t", vec![1]);
        let key2 = Key::primary(ns.clone(), "t", vec![2]);

        index.insert(key1.clone());
        index.insert(key2.clone());

        let keys = index.get(&ns).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&key1));
        assert!(keys.contains(&key2));
    }

    #[test]
    fn test_remove_cleans_up_empty_namespace() {
        let mut index = NamespaceIndex::new();
        let ns = Name::new("hello");
        let key = Key::primary(ns.clone(), "t", vec![1]);

        index.insert(key.clone());
        index.remove(&key);

        assert!(index.get(&ns).is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_multiple_namespaces() {
        let mut index = NamespaceIndex::new();
        index.insert(Key::primary(Name::new("a"), "t", vec![1]));
        index.insert(Key::primary(Name::new("b"), "t", vec![1]));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&Name::new("a")).unwrap().len(), 1);
    }
}
