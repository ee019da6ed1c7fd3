//! Namespaced state access for the executing frame
//!
//! Tables and singletons never talk to storage or the call stack directly.
//! They go through [`StateAccess`], which scopes every key to one contract
//! namespace and routes reads through the live frames and writes into the
//! top frame's log.

use tessera_core::{Error, Key, Name, Result, Storage, TableLayout};

use crate::stack::CallStack;

/// Read/write access to one contract's state inside the current frame
pub trait StateAccess {
    /// Namespace every key must belong to
    fn namespace(&self) -> &Name;

    /// Read a key as seen by the current frame
    fn read(&self, key: &Key) -> Result<Option<Vec<u8>>>;

    /// Scan keys starting with `prefix`, in key order
    fn scan(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>>;

    /// Buffer a write in the current frame
    fn write(&mut self, key: Key, bytes: Vec<u8>) -> Result<()>;

    /// Buffer a delete in the current frame
    fn remove(&mut self, key: Key) -> Result<()>;

    /// Fail unless `layout` is how the owning contract declared the table
    ///
    /// Access without a deployed contract behind it accepts any layout.
    fn check_layout(&self, _layout: &TableLayout) -> Result<()> {
        Ok(())
    }
}

/// Check that `key` lives in `namespace`
pub fn ensure_namespace(namespace: &Name, key: &Key) -> Result<()> {
    if &key.namespace != namespace {
        return Err(Error::InvalidOperation(format!(
            "Contract '{}' cannot access state of '{}'",
            namespace, key.namespace
        )));
    }
    Ok(())
}

/// [`StateAccess`] over a store and a call stack, fixed to one namespace
pub struct FrameState<'a> {
    store: &'a dyn Storage,
    stack: &'a mut CallStack,
    namespace: Name,
}

impl<'a> FrameState<'a> {
    /// Scope `stack` + `store` to `namespace`
    pub fn new(store: &'a dyn Storage, stack: &'a mut CallStack, namespace: Name) -> Self {
        Self {
            store,
            stack,
            namespace,
        }
    }
}

impl StateAccess for FrameState<'_> {
    fn namespace(&self) -> &Name {
        &self.namespace
    }

    fn read(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        ensure_namespace(&self.namespace, key)?;
        self.stack.read(self.store, key)
    }

    fn scan(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>> {
        ensure_namespace(&self.namespace, prefix)?;
        self.stack.scan_prefix(self.store, prefix)
    }

    fn write(&mut self, key: Key, bytes: Vec<u8>) -> Result<()> {
        ensure_namespace(&self.namespace, &key)?;
        self.stack.write(key, bytes)
    }

    fn remove(&mut self, key: Key) -> Result<()> {
        ensure_namespace(&self.namespace, &key)?;
        self.stack.remove(key)
    }
}
