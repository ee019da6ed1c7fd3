//! Core types for tessera
//!
//! This module defines the foundational types:
//! - Name: Identity of a contract or account, also usable as a primary key
//! - KeySpace: Discriminates a table's primary entries from its index entries
//! - Key: Composite storage key (namespace + table + space + user_key)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a contract, account or record owner
///
/// Names are opaque strings: comparable, hashable and printable. They are
/// used both as the namespace a contract's tables live under and as an
/// ordinary primary key domain for records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    /// Create a name from any string-like value
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Reserved namespace for ledger-owned tables (balances)
    pub fn system() -> Self {
        Self(SYSTEM_NAMESPACE.to_string())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the reserved system namespace
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_NAMESPACE
    }
}

const SYSTEM_NAMESPACE: &str = "__system";

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which part of a table a key belongs to
///
/// Ordering puts the primary entries of a table before its index entries,
/// and index entries in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeySpace {
    /// Primary key → encoded record
    Primary,
    /// Secondary index `n` → encoded primary key
    Index(u8),
}

impl fmt::Display for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpace::Primary => write!(f, "primary"),
            KeySpace::Index(n) => write!(f, "index#{}", n),
        }
    }
}

/// Composite storage key
///
/// Keys order by namespace, then table, then space, then user key bytes.
/// Because user keys are produced by an order-preserving encoding, a range
/// of keys inside one space is a range of field values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Owning contract
    pub namespace: Name,
    /// Declared table or singleton name
    pub table: String,
    /// Primary or index space
    pub space: KeySpace,
    /// Order-preserving encoded key bytes
    pub user_key: Vec<u8>,
}

impl Key {
    /// Create a new key
    pub fn new(namespace: Name, table: impl Into<String>, space: KeySpace, user_key: Vec<u8>) -> Self {
        Self {
            namespace,
            table: table.into(),
            space,
            user_key,
        }
    }

    /// Key of a record in a table's primary space
    pub fn primary(namespace: Name, table: impl Into<String>, user_key: Vec<u8>) -> Self {
        Self::new(namespace, table, KeySpace::Primary, user_key)
    }

    /// Key of an entry in one of a table's secondary indices
    pub fn index(namespace: Name, table: impl Into<String>, index: u8, user_key: Vec<u8>) -> Self {
        Self::new(namespace, table, KeySpace::Index(index), user_key)
    }

    /// True if `self` is in the same namespace, table and space as `prefix`
    /// and its user key starts with the prefix's user key
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.namespace == prefix.namespace
            && self.table == prefix.table
            && self.space == prefix.space
            && self.user_key.starts_with(&prefix.user_key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/", self.namespace, self.table, self.space)?;
        for b in &self.user_key {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
