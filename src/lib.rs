//! Tessera - contract state tables and nested contract invocation
//!
//! Tessera is the persistent state layer of a ledger execution unit
//! ("contract"): indexed record tables, singletons, and synchronous nested
//! calls between contracts with resource transfer and all-or-nothing
//! rollback.
//!
//! # Quick Start
//!
//! ```ignore
//! use tessera::{CallArgs, CallContext, Contract, Ledger, Name, Result, SchemaRegistry, Singleton};
//!
//! struct Visits {
//!     counter: Singleton<u64>,
//! }
//!
//! impl Contract for Visits {
//!     fn methods(&self) -> &[&'static str] {
//!         &["visit"]
//!     }
//!
//!     fn schema(&self) -> Result<SchemaRegistry> {
//!         SchemaRegistry::builder().singleton(&self.counter).build()
//!     }
//!
//!     fn invoke(&self, ctx: &mut CallContext<'_>, _method: &str, _args: &CallArgs) -> Result<()> {
//!         self.counter.get_or_create(ctx)?;
//!         self.counter.update(ctx, |n| *n += 1)?;
//!         Ok(())
//!     }
//! }
//!
//! let ledger = Ledger::new();
//! ledger.deploy("visits", Arc::new(Visits { counter: Singleton::new("counter") }))?;
//! ledger.transact("alice", "visits", "visit", 0, CallArgs::empty())?;
//! ```
//!
//! # Architecture
//!
//! The workspace is layered leaves first: `tessera-core` (codec, keys,
//! errors), `tessera-storage` (committed store), `tessera-concurrency`
//! (frames and the call stack), `tessera-primitives` (tables and
//! singletons) and `tessera-engine` (ledger and dispatcher). This crate
//! re-exports the contract-facing API of all of them.

pub use tessera_concurrency::{FrameState, StateAccess};
pub use tessera_core::{
    decode_record, encode_record, CallArgs, Error, Key, KeyEncode, KeySpace, Name, Record, Result,
    Storage, Timestamp,
};
pub use tessera_engine::{
    Account, BufferConsole, CallContext, Clock, Console, Contract, InvocationMetrics, Ledger,
    LedgerConfig, ManualClock, SilentConsole, SystemClock, TracingConsole,
};
pub use tessera_primitives::{
    SchemaRegistry, Singleton, Table, TableInfo, TableKey, TableKind, TableSchema,
};
pub use tessera_storage::UnifiedStore;
