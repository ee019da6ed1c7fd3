//! Concurrency layer for tessera
//!
//! This crate implements the frame model behind nested contract calls:
//! - Frame: one method execution with its own pending mutation log
//! - CallStack: explicit, depth-first stack of frames with commit/rollback
//! - StateAccess / FrameState: namespaced reads and writes through the stack
//!
//! Execution is single-threaded within one outer transaction. Frames never
//! run concurrently; a nested frame's mutations are ordered before anything
//! its invoker writes after the call returns.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frame;
pub mod stack;
pub mod state;

pub use frame::{Frame, FrameStatus, Invocation, PendingOperations};
pub use stack::{CallStack, CommitOutcome, DEFAULT_MAX_CALL_DEPTH};
pub use state::{ensure_namespace, FrameState, StateAccess};
