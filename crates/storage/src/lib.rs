//! Storage layer for tessera
//!
//! This crate implements the committed-state backend:
//! - UnifiedStore: BTreeMap-based storage with RwLock and atomic batch apply
//! - NamespaceIndex: contract namespace → keys, for contract-scoped dumps
//! - StoredValue: committed bytes tagged with their batch version

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod stored_value;
pub mod unified;

pub use index::NamespaceIndex;
pub use stored_value::StoredValue;
pub use unified::UnifiedStore;
