//! Explicit call stack of invocation frames
//!
//! Nesting is strictly depth-first: only the top frame executes, and a frame
//! leaves the stack either by committing (its log moves into the parent, or
//! to storage for the outermost frame) or by rolling back (its log is
//! dropped). Reads look through the frames top-down before falling back to
//! committed storage, so a nested frame sees everything its invokers wrote.

use std::collections::BTreeMap;
use tessera_core::{Error, Key, Result, Storage};
use tracing::debug;

use crate::frame::{Frame, Invocation};

/// Default nesting limit
pub const DEFAULT_MAX_CALL_DEPTH: usize = 16;

/// Stack of live frames for one outer transaction
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    next_frame_id: u64,
    max_depth: usize,
}

/// What happened to a frame that left the stack by committing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Log folded into the parent frame
    Merged,
    /// Outermost frame: log applied to storage at this version
    Applied(u64),
}

impl CallStack {
    /// Create an empty stack with the default depth limit
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Create an empty stack that holds at most `max_depth` frames
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            next_frame_id: 1,
            max_depth,
        }
    }

    /// Number of live frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame is live
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The executing frame
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Build an idle frame for `invocation` at the next depth
    ///
    /// Fails with `CallDepthExceeded` if pushing it would exceed the limit.
    pub fn new_frame(&mut self, invocation: Invocation) -> Result<Frame> {
        let depth = self.frames.len();
        if depth >= self.max_depth {
            return Err(Error::CallDepthExceeded {
                depth,
                max: self.max_depth,
            });
        }
        let frame_id = self.next_frame_id;
        self.next_frame_id += 1;
        Ok(Frame::new(frame_id, depth, invocation))
    }

    /// Push an executing frame
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if !frame.is_executing() {
            return Err(Error::InvalidOperation(format!(
                "Only executing frames can be pushed, frame {} is {:?}",
                frame.frame_id,
                frame.status()
            )));
        }
        if frame.depth != self.frames.len() {
            return Err(Error::InvalidOperation(format!(
                "Frame {} built for depth {} pushed at depth {}",
                frame.frame_id,
                frame.depth,
                self.frames.len()
            )));
        }
        debug!(
            target: "tessera::frame",
            frame_id = frame.frame_id,
            depth = frame.depth,
            target_contract = %frame.invocation.target,
            method = %frame.invocation.method,
            "Frame pushed"
        );
        self.frames.push(frame);
        Ok(())
    }

    fn pop(&mut self) -> Result<Frame> {
        self.frames
            .pop()
            .ok_or_else(|| Error::InvalidOperation("Call stack is empty".to_string()))
    }

    /// Commit the top frame
    ///
    /// A nested frame's log moves into its parent. The outermost frame's log
    /// is applied to `store` as one atomic batch.
    pub fn commit_top(&mut self, store: &dyn Storage) -> Result<CommitOutcome> {
        let mut frame = self.pop()?;
        let frame_id = frame.frame_id;

        let outcome = match self.frames.last_mut() {
            Some(parent) => {
                frame.mark_committed()?;
                parent.absorb(frame)?;
                CommitOutcome::Merged
            }
            None => {
                let (writes, deletes) = frame.take_batch();
                let version = store.apply_batch(writes, deletes)?;
                frame.mark_committed()?;
                CommitOutcome::Applied(version)
            }
        };

        debug!(target: "tessera::frame", frame_id, ?outcome, "Frame committed");
        Ok(outcome)
    }

    /// Roll back the top frame, discarding its log
    ///
    /// Returns the rolled-back frame for inspection.
    pub fn rollback_top(&mut self, reason: impl Into<String>) -> Result<Frame> {
        let mut frame = self.pop()?;
        let reason = reason.into();
        let discarded = frame.pending_operations().total();
        frame.mark_rolled_back(reason.clone())?;
        debug!(
            target: "tessera::frame",
            frame_id = frame.frame_id,
            discarded,
            %reason,
            "Frame rolled back"
        );
        Ok(frame)
    }

    // ========== Frame-aware reads and writes ==========

    /// Read a key as seen by the top frame
    pub fn read(&self, store: &dyn Storage, key: &Key) -> Result<Option<Vec<u8>>> {
        for frame in self.frames.iter().rev() {
            if let Some(entry) = frame.pending(key) {
                return Ok(entry.map(<[u8]>::to_vec));
            }
        }
        store.get(key)
    }

    /// Scan a prefix as seen by the top frame, in key order
    pub fn scan_prefix(&self, store: &dyn Storage, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        let mut merged: BTreeMap<Key, Vec<u8>> = store.scan_prefix(prefix)?.into_iter().collect();

        // outermost first so that inner frames override
        for frame in &self.frames {
            for (key, entry) in frame.pending_with_prefix(prefix) {
                match entry {
                    Some(bytes) => {
                        merged.insert(key.clone(), bytes.to_vec());
                    }
                    None => {
                        merged.remove(key);
                    }
                }
            }
        }

        Ok(merged.into_iter().collect())
    }

    /// Buffer a write in the top frame
    pub fn write(&mut self, key: Key, bytes: Vec<u8>) -> Result<()> {
        self.top_frame_mut()?.put(key, bytes)
    }

    /// Buffer a delete in the top frame
    pub fn remove(&mut self, key: Key) -> Result<()> {
        self.top_frame_mut()?.delete(key)
    }

    fn top_frame_mut(&mut self) -> Result<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| Error::InvalidOperation("No active frame".to_string()))
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
