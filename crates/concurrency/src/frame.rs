//! Invocation frames
//!
//! A frame is the runtime context of one method execution: who called, which
//! contract and method run, what was transferred, and every state mutation
//! the method performed so far. Mutations are buffered in the frame's
//! pending log and only reach storage when the outermost frame commits.
//! Rolling back a frame is discarding its log.

use std::collections::BTreeMap;
use tessera_core::{CallArgs, Error, Key, Name, Result};

/// One requested invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Identity that initiated the call
    pub caller: Name,
    /// Contract whose method runs
    pub target: Name,
    /// Method name, resolved against the target's declared methods
    pub method: String,
    /// Amount moved from caller to target before the body runs
    pub amount: u64,
    /// Encoded positional arguments
    pub args: CallArgs,
}

impl Invocation {
    /// Describe a call
    pub fn new(
        caller: Name,
        target: Name,
        method: impl Into<String>,
        amount: u64,
        args: CallArgs,
    ) -> Self {
        Self {
            caller,
            target,
            method: method.into(),
            amount,
            args,
        }
    }
}

/// Status of a frame in its lifecycle
///
/// State transitions:
/// - `Idle` → `Resolving` (dispatcher starts resolving the target)
/// - `Resolving` → `Executing` (method found, frame pushed)
/// - `Executing` → `Committed` (body returned Ok)
/// - `Idle | Resolving | Executing` → `RolledBack` (any failure)
///
/// Terminal states: `Committed`, `RolledBack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// Created, not yet dispatched
    Idle,
    /// Target and method are being resolved
    Resolving,
    /// Body is running; the frame accepts mutations
    Executing,
    /// Mutations handed to the parent frame or to storage
    Committed,
    /// Mutations discarded
    RolledBack {
        /// Human-readable reason
        reason: String,
    },
}

/// Summary of buffered mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingOperations {
    /// Number of pending writes
    pub puts: usize,
    /// Number of pending deletes
    pub deletes: usize,
}

impl PendingOperations {
    /// Total number of pending operations
    pub fn total(&self) -> usize {
        self.puts + self.deletes
    }

    /// Check if there are no pending operations
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Runtime context of one method execution
#[derive(Debug)]
pub struct Frame {
    /// Unique id within one call stack
    pub frame_id: u64,
    /// Position in the stack (0 = outermost)
    pub depth: usize,
    /// The call this frame executes
    pub invocation: Invocation,
    /// Pending mutation log: `Some` = write, `None` = delete
    log: BTreeMap<Key, Option<Vec<u8>>>,
    status: FrameStatus,
}

impl Frame {
    /// Create an idle frame
    pub fn new(frame_id: u64, depth: usize, invocation: Invocation) -> Self {
        Self {
            frame_id,
            depth,
            invocation,
            log: BTreeMap::new(),
            status: FrameStatus::Idle,
        }
    }

    /// Current status
    pub fn status(&self) -> &FrameStatus {
        &self.status
    }

    /// True while the body may mutate state
    pub fn is_executing(&self) -> bool {
        self.status == FrameStatus::Executing
    }

    /// Reason recorded on rollback, if any
    pub fn rollback_reason(&self) -> Option<&str> {
        match &self.status {
            FrameStatus::RolledBack { reason } => Some(reason),
            _ => None,
        }
    }

    // ========== State transitions ==========

    /// `Idle` → `Resolving`
    pub fn mark_resolving(&mut self) -> Result<()> {
        self.transition(FrameStatus::Idle, FrameStatus::Resolving)
    }

    /// `Resolving` → `Executing`
    pub fn mark_executing(&mut self) -> Result<()> {
        self.transition(FrameStatus::Resolving, FrameStatus::Executing)
    }

    /// `Executing` → `Committed`
    pub fn mark_committed(&mut self) -> Result<()> {
        self.transition(FrameStatus::Executing, FrameStatus::Committed)
    }

    /// Any non-terminal state → `RolledBack`, discarding the pending log
    pub fn mark_rolled_back(&mut self, reason: impl Into<String>) -> Result<()> {
        match self.status {
            FrameStatus::Committed | FrameStatus::RolledBack { .. } => {
                Err(Error::InvalidOperation(format!(
                    "Cannot roll back frame {} in state {:?}",
                    self.frame_id, self.status
                )))
            }
            _ => {
                self.log.clear();
                self.status = FrameStatus::RolledBack {
                    reason: reason.into(),
                };
                Ok(())
            }
        }
    }

    fn transition(&mut self, from: FrameStatus, to: FrameStatus) -> Result<()> {
        if self.status != from {
            return Err(Error::InvalidOperation(format!(
                "Frame {} cannot move to {:?} from {:?}",
                self.frame_id, to, self.status
            )));
        }
        self.status = to;
        Ok(())
    }

    fn ensure_executing(&self) -> Result<()> {
        if !self.is_executing() {
            return Err(Error::InvalidOperation(format!(
                "Frame {} is not executing: {:?}",
                self.frame_id, self.status
            )));
        }
        Ok(())
    }

    // ========== Mutation log ==========

    /// Pending entry for a key
    ///
    /// - `None`: this frame has not touched the key
    /// - `Some(None)`: this frame deleted the key
    /// - `Some(Some(bytes))`: this frame wrote the key
    pub fn pending(&self, key: &Key) -> Option<Option<&[u8]>> {
        self.log.get(key).map(|entry| entry.as_deref())
    }

    /// Pending entries whose key starts with `prefix`, in key order
    pub fn pending_with_prefix<'a>(
        &'a self,
        prefix: &'a Key,
    ) -> impl Iterator<Item = (&'a Key, Option<&'a [u8]>)> + 'a {
        self.log
            .range(prefix.clone()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k, v.as_deref()))
    }

    /// Buffer a write
    pub fn put(&mut self, key: Key, bytes: Vec<u8>) -> Result<()> {
        self.ensure_executing()?;
        self.log.insert(key, Some(bytes));
        Ok(())
    }

    /// Buffer a delete
    pub fn delete(&mut self, key: Key) -> Result<()> {
        self.ensure_executing()?;
        self.log.insert(key, None);
        Ok(())
    }

    /// Fold a committed child frame's log into this one
    ///
    /// The child's entries win: they were written after this frame's.
    pub fn absorb(&mut self, child: Frame) -> Result<()> {
        self.ensure_executing()?;
        self.log.extend(child.log);
        Ok(())
    }

    /// Counts of buffered writes and deletes
    pub fn pending_operations(&self) -> PendingOperations {
        let deletes = self.log.values().filter(|v| v.is_none()).count();
        PendingOperations {
            puts: self.log.len() - deletes,
            deletes,
        }
    }

    /// Split the log into a storage batch: (writes, deletes)
    pub fn take_batch(&mut self) -> (Vec<(Key, Vec<u8>)>, Vec<Key>) {
        let mut writes = Vec::new();
        let mut deletes = Vec::new();
        for (key, entry) in std::mem::take(&mut self.log) {
            match entry {
                Some(bytes) => writes.push((key, bytes)),
                None => deletes.push(key),
            }
        }
        (writes, deletes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation::new(
            Name::new("alice"),
            Name::new("hello"),
            "hi",
            0,
            CallArgs::empty(),
        )
    }

    fn executing_frame() -> Frame {
        let mut frame = Frame::new(1, 0, invocation());
        frame.mark_resolving().unwrap();
        frame.mark_executing().unwrap();
        frame
    }

    fn key(k: &[u8]) -> Key {
        Key::primary(Name::new("hello"), "t", k.to_vec())
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut frame = Frame::new(1, 0, invocation());
        assert_eq!(frame.status(), &FrameStatus::Idle);
        frame.mark_resolving().unwrap();
        frame.mark_executing().unwrap();
        frame.mark_committed().unwrap();
        assert_eq!(frame.status(), &FrameStatus::Committed);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut frame = Frame::new(1, 0, invocation());
        assert!(frame.mark_executing().is_err());
        assert!(frame.mark_committed().is_err());

        let mut frame = executing_frame();
        frame.mark_committed().unwrap();
        assert!(frame.mark_rolled_back("late").is_err());
    }

    #[test]
    fn test_writes_require_executing() {
        let mut frame = Frame::new(1, 0, invocation());
        assert!(frame.put(key(b"k"), vec![1]).is_err());
    }

    #[test]
    fn test_rollback_discards_log() {
        let mut frame = executing_frame();
        frame.put(key(b"a"), vec![1]).unwrap();
        frame.delete(key(b"b")).unwrap();
        assert_eq!(frame.pending_operations(), PendingOperations { puts: 1, deletes: 1 });

        frame.mark_rolled_back("boom").unwrap();
        assert!(frame.pending_operations().is_empty());
        assert_eq!(frame.rollback_reason(), Some("boom"));
    }

    #[test]
    fn test_absorb_child_overrides_parent() {
        let mut parent = executing_frame();
        parent.put(key(b"a"), vec![1]).unwrap();

        let mut child = executing_frame();
        child.put(key(b"a"), vec![2]).unwrap();
        child.delete(key(b"b")).unwrap();

        parent.absorb(child).unwrap();
        assert_eq!(parent.pending(&key(b"a")), Some(Some(&[2u8][..])));
        assert_eq!(parent.pending(&key(b"b")), Some(None));
        assert_eq!(parent.pending(&key(b"c")), None);
    }

    #[test]
    fn test_take_batch_splits_writes_and_deletes() {
        let mut frame = executing_frame();
        frame.put(key(b"a"), vec![1]).unwrap();
        frame.delete(key(b"b")).unwrap();

        let (writes, deletes) = frame.take_batch();
        assert_eq!(writes, vec![(key(b"a"), vec![1])]);
        assert_eq!(deletes, vec![key(b"b")]);
        assert!(frame.pending_operations().is_empty());
    }
}
