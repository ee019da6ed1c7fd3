//! Execution context handed to a contract method
//!
//! A `CallContext` is created for each frame. It is the contract's view of
//! the world: state access scoped to the contract's own namespace, the
//! invocation that started the frame, the transaction timestamp, console
//! output, and nested calls through [`CallContext::execute`].
//!
//! Writes are checked against the contract's [`SchemaRegistry`]: a key must
//! fall in a declared table and one of its declared spaces, and a table
//! handle must carry the declared layout.

use tessera_concurrency::{ensure_namespace, CallStack, FrameState, Invocation, StateAccess};
use tessera_core::{CallArgs, Error, Key, Name, Result, TableLayout, Timestamp};
use tessera_primitives::SchemaRegistry;

use crate::dispatcher;
use crate::ledger::Ledger;

/// Per-frame view passed to [`Contract::invoke`](crate::Contract::invoke)
pub struct CallContext<'a> {
    ledger: &'a Ledger,
    stack: &'a mut CallStack,
    schema: &'a SchemaRegistry,
    now: Timestamp,
    invocation: Invocation,
    depth: usize,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        stack: &'a mut CallStack,
        schema: &'a SchemaRegistry,
        now: Timestamp,
        invocation: Invocation,
        depth: usize,
    ) -> Self {
        Self {
            ledger,
            stack,
            schema,
            now,
            invocation,
            depth,
        }
    }

    /// Contract whose method is running
    pub fn contract_name(&self) -> &Name {
        &self.invocation.target
    }

    /// Identity that invoked this frame
    pub fn caller(&self) -> &Name {
        &self.invocation.caller
    }

    /// Method being executed
    pub fn method(&self) -> &str {
        &self.invocation.method
    }

    /// Amount transferred into this frame
    pub fn amount(&self) -> u64 {
        self.invocation.amount
    }

    /// Encoded arguments of this frame
    pub fn args(&self) -> &CallArgs {
        &self.invocation.args
    }

    /// Zero for the outermost call
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Timestamp of the enclosing transaction
    pub fn current_timestamp(&self) -> Timestamp {
        self.now
    }

    /// Emit text on behalf of this contract
    pub fn print(&self, message: impl AsRef<str>) {
        if self.ledger.config().console_output {
            self.ledger.console().print(self.contract_name(), message.as_ref());
        }
    }

    /// Abort the frame with `message` unless `condition` holds
    pub fn require(&self, condition: bool, message: impl Into<String>) -> Result<()> {
        if condition {
            Ok(())
        } else {
            Err(Error::abort(message))
        }
    }

    /// Balance of `account` as seen by this frame
    pub fn balance_of(&mut self, account: &Name) -> Result<u64> {
        let state = FrameState::new(self.ledger.store(), &mut *self.stack, Name::system());
        self.ledger.balances().balance(&state, account)
    }

    /// Call `method` on `target`, moving `amount` from this contract first
    ///
    /// Runs to completion before returning. On success the callee's writes
    /// are visible to the rest of this frame; on failure they are discarded
    /// and the error comes back as `InvocationFailure`.
    pub fn execute(
        &mut self,
        target: impl Into<Name>,
        method: &str,
        amount: u64,
        args: CallArgs,
    ) -> Result<()> {
        let invocation = Invocation::new(
            self.contract_name().clone(),
            target.into(),
            method,
            amount,
            args,
        );
        dispatcher::dispatch(self.ledger, &mut *self.stack, self.now, invocation)
    }
}

impl StateAccess for CallContext<'_> {
    fn namespace(&self) -> &Name {
        &self.invocation.target
    }

    fn read(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        ensure_namespace(self.namespace(), key)?;
        self.stack.read(self.ledger.store(), key)
    }

    fn scan(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        ensure_namespace(self.namespace(), prefix)?;
        self.stack.scan_prefix(self.ledger.store(), prefix)
    }

    fn write(&mut self, key: Key, bytes: Vec<u8>) -> Result<()> {
        ensure_namespace(self.namespace(), &key)?;
        self.schema.check_key(&key)?;
        self.stack.write(key, bytes)
    }

    fn remove(&mut self, key: Key) -> Result<()> {
        ensure_namespace(self.namespace(), &key)?;
        self.schema.check_key(&key)?;
        self.stack.remove(key)
    }

    fn check_layout(&self, layout: &TableLayout) -> Result<()> {
        self.schema.check_layout(layout)
    }
}
