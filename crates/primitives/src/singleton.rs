//! Singleton: a table holding at most one record
//!
//! A singleton is a [`Table`] keyed by `()`, so its one record lives under
//! the declared name with an empty user key. The record is materialized on
//! first access from a default constructor, which makes the type a natural
//! home for per-contract counters and settings.

use std::fmt;
use std::sync::Arc;

use tessera_concurrency::StateAccess;
use tessera_core::{Error, Record, Result, TableLayout};
use tracing::trace;

use crate::schema::TableSchema;
use crate::table::Table;

type DefaultFn<R> = Arc<dyn Fn() -> R + Send + Sync>;

/// Named single-record store
pub struct Singleton<R> {
    table: Table<R, ()>,
    default: DefaultFn<R>,
}

impl<R> Clone for Singleton<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            default: Arc::clone(&self.default),
        }
    }
}

impl<R> fmt::Debug for Singleton<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton").field("table", &self.table).finish()
    }
}

impl<R: Record> Singleton<R> {
    /// Singleton created from `R::default()`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_default(name, R::default)
    }

    /// Singleton created from a custom constructor
    pub fn with_default<F>(name: impl Into<String>, default: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self {
            table: Table::new(TableSchema::new(name, |_: &R| ())),
            default: Arc::new(default),
        }
    }

    /// Declared name
    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// Layout of the backing table: the name and no indices
    pub fn layout(&self) -> &TableLayout {
        self.table.layout()
    }

    /// Whether the record has been created
    pub fn exists<S: StateAccess + ?Sized>(&self, state: &S) -> Result<bool> {
        self.table.has(state, &())
    }

    /// Current record
    ///
    /// Fails with `RecordNotFound` if it was never created.
    pub fn get<S: StateAccess + ?Sized>(&self, state: &S) -> Result<R> {
        self.table.get(state, &()).map_err(|err| match err {
            Error::RecordNotFound { table, .. } => Error::RecordNotFound {
                table,
                key: "()".to_string(),
            },
            other => other,
        })
    }

    /// Current record, creating it from the default constructor first if
    /// absent
    ///
    /// Calling this any number of times writes at most once.
    pub fn get_or_create<S: StateAccess + ?Sized>(&self, state: &mut S) -> Result<R> {
        if let Some(record) = self.table.find(state, &())? {
            return Ok(record);
        }
        let initial = (self.default)();
        let record = self.table.insert(state, move |r| *r = initial)?;
        trace!(target: "tessera::table", singleton = self.name(), "Singleton created");
        Ok(record)
    }

    /// Modify the record in place
    ///
    /// Fails with `RecordNotFound` if it was never created.
    pub fn update<S, F>(&self, state: &mut S, mutator: F) -> Result<R>
    where
        S: StateAccess + ?Sized,
        F: FnOnce(&mut R),
    {
        self.table.update(state, &(), mutator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tessera_concurrency::{CallStack, FrameState, Invocation};
    use tessera_core::{CallArgs, Key, Name};
    use tessera_storage::UnifiedStore;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Stats {
        users: u32,
        visits: u32,
    }

    fn open_stack() -> CallStack {
        let mut stack = CallStack::new();
        let mut frame = stack
            .new_frame(Invocation::new(
                Name::new("alice"),
                Name::new("hello"),
                "hi",
                0,
                CallArgs::empty(),
            ))
            .unwrap();
        frame.mark_resolving().unwrap();
        frame.mark_executing().unwrap();
        stack.push(frame).unwrap();
        stack
    }

    #[test]
    fn test_get_before_create_is_not_found() {
        let store = UnifiedStore::new();
        let mut stack = open_stack();
        let state = FrameState::new(&store, &mut stack, Name::new("hello"));
        let counter: Singleton<Stats> = Singleton::new("global_counters");

        assert!(!counter.exists(&state).unwrap());
        assert!(counter.get(&state).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = UnifiedStore::new();
        let mut stack = open_stack();
        let counter: Singleton<Stats> = Singleton::new("global_counters");

        {
            let mut state = FrameState::new(&store, &mut stack, Name::new("hello"));
            let first = counter.get_or_create(&mut state).unwrap();
            let second = counter.get_or_create(&mut state).unwrap();
            assert_eq!(first, second);
            assert!(counter.exists(&state).unwrap());
        }

        let ops = stack.top().unwrap().pending_operations();
        assert_eq!(ops.puts, 1);
    }

    #[test]
    fn test_update_after_create() {
        let store = UnifiedStore::new();
        let mut stack = open_stack();
        let mut state = FrameState::new(&store, &mut stack, Name::new("hello"));
        let counter: Singleton<Stats> = Singleton::new("global_counters");

        assert!(counter.update(&mut state, |s| s.visits += 1).is_err());

        counter.get_or_create(&mut state).unwrap();
        counter
            .update(&mut state, |s| {
                s.users += 1;
                s.visits += 1;
            })
            .unwrap();
        counter.update(&mut state, |s| s.visits += 1).unwrap();

        assert_eq!(counter.get(&state).unwrap(), Stats { users: 1, visits: 2 });
    }

    #[test]
    fn test_custom_default_and_layout() {
        let store = UnifiedStore::new();
        let mut stack = open_stack();
        let mut state = FrameState::new(&store, &mut stack, Name::new("hello"));
        let counter = Singleton::with_default("seeded", || Stats {
            users: 0,
            visits: 100,
        });

        assert_eq!(counter.get_or_create(&mut state).unwrap().visits, 100);

        let entry = Key::primary(Name::new("hello"), "seeded", Vec::new());
        assert!(state.read(&entry).unwrap().is_some());
    }
}
