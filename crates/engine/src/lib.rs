//! Execution engine for tessera
//!
//! This crate ties the lower layers together:
//! - Ledger: contract registry, committed store, transaction entry point
//! - Dispatcher: runs invocations as frames with transfer, commit and rollback
//! - CallContext: the per-frame view a contract method works through
//! - Balances: resource accounts stored in the system namespace
//! - Clock / Console: services contracts call into
//! - Configuration (`tessera.toml`) and invocation metrics
//!
//! The engine is the only component that knows about deployed contracts
//! and how nested calls are wired.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod balances;
pub mod clock;
pub mod config;
pub mod console;
pub mod context;
pub mod contract;
mod dispatcher;
pub mod ledger;
pub mod metrics;

pub use balances::{Account, Balances, BALANCES_TABLE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LedgerConfig, CONFIG_FILE_NAME};
pub use console::{BufferConsole, Console, SilentConsole, TracingConsole};
pub use context::CallContext;
pub use contract::Contract;
pub use ledger::Ledger;
pub use metrics::{InvocationCounters, InvocationMetrics};
