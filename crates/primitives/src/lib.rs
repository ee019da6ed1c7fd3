//! Primitives layer for tessera
//!
//! Provides the contract-facing stores as stateless handles over a
//! [`StateAccess`](tessera_concurrency::StateAccess) view:
//! - **TableSchema**: table declaration with primary and secondary adapters
//! - **Table**: indexed record store with unique primary keys
//! - **Singleton**: single-record table for counters and settings
//! - **SchemaRegistry**: the validated set of declarations of one contract
//!
//! ## Design Principle: Stateless Handles
//!
//! A handle holds only its declaration. Every operation takes the state
//! view of the executing frame, so writes are buffered in that frame and
//! commit or roll back with it.
//!
//! ## Namespace Isolation
//!
//! Every key is scoped to the namespace of the state view. A contract can
//! only reach its own tables; other contracts' state is reachable only by
//! invoking their methods.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;
pub mod schema;
pub mod singleton;
pub mod table;

pub use registry::{SchemaRegistry, SchemaRegistryBuilder, TableInfo, TableKind};
pub use schema::{IndexDiff, SecondaryIndex, TableSchema, TableSchemaBuilder, MAX_SECONDARY_INDICES};
pub use singleton::Singleton;
pub use table::{Table, TableKey};
