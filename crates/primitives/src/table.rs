//! Table: indexed record store keyed by a unique primary key
//!
//! ## Design
//!
//! A `Table` is a stateless handle: it holds only its schema and works
//! against whatever [`StateAccess`] the caller passes in, so the same
//! declaration serves every frame and every call of the owning contract.
//! All writes land in the current frame's pending log and share that
//! frame's commit or rollback.
//!
//! ## Atomicity
//!
//! `insert` and `update` perform every check (duplicate key, missing key,
//! primary key change, encoding) before their first write. A failing
//! operation therefore leaves the frame's log exactly as it found it.
//!
//! ## Example
//!
//! ```rust,ignore
//! let greetings = Table::new(
//!     TableSchema::builder("table_greetings", |g: &Greeting| g.name.clone())
//!         .secondary("count", |g: &Greeting| g.count)
//!         .build()?,
//! );
//!
//! if !greetings.has(ctx, &user)? {
//!     greetings.insert(ctx, |g| {
//!         g.name = user.clone();
//!         g.count = 1;
//!     })?;
//! } else {
//!     greetings.update(ctx, &user, |g| g.count += 1)?;
//! }
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tessera_concurrency::StateAccess;
use tessera_core::{
    decode_record, encode_record, Error, Key, KeyEncode, Record, Result, TableLayout,
};
use tracing::trace;

use crate::schema::{SecondaryIndex, TableSchema};

/// Types usable as a primary key
pub trait TableKey:
    KeyEncode + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static
{
}

impl<T> TableKey for T where
    T: KeyEncode + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static
{
}

/// Indexed record store for record type `R` keyed by `K`
pub struct Table<R, K> {
    schema: Arc<TableSchema<R, K>>,
    layout: Arc<TableLayout>,
}

impl<R, K> Clone for Table<R, K> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            layout: Arc::clone(&self.layout),
        }
    }
}

impl<R, K> Debug for Table<R, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("schema", &self.schema).finish()
    }
}

impl<R: Record, K: TableKey> Table<R, K> {
    /// Create a table handle from its declaration
    pub fn new(schema: TableSchema<R, K>) -> Self {
        Self {
            layout: Arc::new(schema.layout()),
            schema: Arc::new(schema),
        }
    }

    /// The table's declaration
    pub fn schema(&self) -> &TableSchema<R, K> {
        &self.schema
    }

    /// Declared table name
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Name and index layout this handle writes with
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn primary_entry<S: StateAccess + ?Sized>(&self, state: &S, key: &K) -> (Vec<u8>, Key) {
        let pk = key.to_key_bytes();
        let entry = self.schema.primary_entry(state.namespace(), &pk);
        (pk, entry)
    }

    fn not_found(&self, key: &K) -> Error {
        Error::RecordNotFound {
            table: self.name().to_string(),
            key: format!("{:?}", key),
        }
    }

    // ========== Reads ==========

    /// True iff a record with this primary key exists
    pub fn has<S: StateAccess + ?Sized>(&self, state: &S, key: &K) -> Result<bool> {
        let (_, entry) = self.primary_entry(state, key);
        Ok(state.read(&entry)?.is_some())
    }

    /// Current record, or `None` if absent
    pub fn find<S: StateAccess + ?Sized>(&self, state: &S, key: &K) -> Result<Option<R>> {
        let (_, entry) = self.primary_entry(state, key);
        match state.read(&entry)? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Current record
    ///
    /// Fails with `RecordNotFound` if absent.
    pub fn get<S: StateAccess + ?Sized>(&self, state: &S, key: &K) -> Result<R> {
        self.find(state, key)?.ok_or_else(|| self.not_found(key))
    }

    /// Every record in primary key order
    pub fn records<S: StateAccess + ?Sized>(&self, state: &S) -> Result<Vec<R>> {
        let prefix = self.schema.primary_entry(state.namespace(), &[]);
        state
            .scan(&prefix)?
            .into_iter()
            .map(|(_, bytes)| decode_record(&bytes))
            .collect()
    }

    /// Number of records
    pub fn len<S: StateAccess + ?Sized>(&self, state: &S) -> Result<usize> {
        let prefix = self.schema.primary_entry(state.namespace(), &[]);
        Ok(state.scan(&prefix)?.len())
    }

    /// True when the table holds no record
    pub fn is_empty<S: StateAccess + ?Sized>(&self, state: &S) -> Result<bool> {
        Ok(self.len(state)? == 0)
    }

    // ========== Writes ==========

    /// Insert a new record
    ///
    /// `init` receives a default-valued record and must populate it,
    /// including the primary key field. Fails with `DuplicateKey` (and writes
    /// nothing) if the resulting key already exists, and with `SchemaError`
    /// if this handle's layout differs from the owning contract's declaration.
    pub fn insert<S, F>(&self, state: &mut S, init: F) -> Result<R>
    where
        S: StateAccess + ?Sized,
        F: FnOnce(&mut R),
    {
        state.check_layout(&self.layout)?;
        let mut record = R::default();
        init(&mut record);

        let key = self.schema.primary_key(&record);
        let (pk, entry) = self.primary_entry(state, &key);
        if state.read(&entry)?.is_some() {
            return Err(Error::DuplicateKey {
                table: self.name().to_string(),
                key: format!("{:?}", key),
            });
        }

        let bytes = encode_record(&record)?;
        let pk_value = encode_record(&key)?;
        let index_entries = self.schema.index_entries(state.namespace(), &record, &pk);

        state.write(entry, bytes)?;
        for index_entry in index_entries {
            state.write(index_entry, pk_value.clone())?;
        }

        trace!(target: "tessera::table", table = self.name(), ?key, "Record inserted");
        Ok(record)
    }

    /// Modify an existing record
    ///
    /// The record is loaded by value and `mutator` edits that copy. Every
    /// secondary entry whose indexed value changed is replaced. Fails with
    /// `RecordNotFound` if absent and with `PrimaryKeyChanged` if `mutator`
    /// altered the primary key; neither failure writes anything.
    pub fn update<S, F>(&self, state: &mut S, key: &K, mutator: F) -> Result<R>
    where
        S: StateAccess + ?Sized,
        F: FnOnce(&mut R),
    {
        state.check_layout(&self.layout)?;
        let (pk, entry) = self.primary_entry(state, key);
        let old: R = match state.read(&entry)? {
            Some(bytes) => decode_record(&bytes)?,
            None => return Err(self.not_found(key)),
        };

        let mut new = old.clone();
        mutator(&mut new);

        let new_key = self.schema.primary_key(&new);
        if new_key.to_key_bytes() != pk {
            return Err(Error::PrimaryKeyChanged {
                table: self.name().to_string(),
                from: format!("{:?}", key),
                to: format!("{:?}", new_key),
            });
        }

        let bytes = encode_record(&new)?;
        let pk_value = encode_record(key)?;
        let diff = self
            .schema
            .diff_index_entries(state.namespace(), &old, &new, &pk);

        state.write(entry, bytes)?;
        for stale in diff.stale {
            state.remove(stale)?;
        }
        for fresh in diff.fresh {
            state.write(fresh, pk_value.clone())?;
        }

        trace!(target: "tessera::table", table = self.name(), ?key, "Record updated");
        Ok(new)
    }

    // ========== Secondary index lookups ==========

    fn typed_index<V: 'static>(&self, index: &str) -> Result<&SecondaryIndex<R>> {
        let index = self.schema.index(index)?;
        index.check_value_type::<V>(self.name())?;
        Ok(index)
    }

    fn decode_keys(entries: Vec<(Key, Vec<u8>)>) -> Result<Vec<K>> {
        entries
            .into_iter()
            .map(|(_, bytes)| decode_record(&bytes))
            .collect()
    }

    /// Primary keys whose record has `value` in the named index
    ///
    /// Keys come back in primary key order.
    pub fn find_by<S, V>(&self, state: &S, index: &str, value: &V) -> Result<Vec<K>>
    where
        S: StateAccess + ?Sized,
        V: KeyEncode + 'static,
    {
        let index = self.typed_index::<V>(index)?;
        let prefix = self
            .schema
            .index_entry(state.namespace(), index, &value.to_key_bytes(), &[]);
        Self::decode_keys(state.scan(&prefix)?)
    }

    /// Primary keys whose indexed value lies in `[lo, hi)`, in index order
    pub fn range_by<S, V>(&self, state: &S, index: &str, lo: &V, hi: &V) -> Result<Vec<K>>
    where
        S: StateAccess + ?Sized,
        V: KeyEncode + 'static,
    {
        let index = self.typed_index::<V>(index)?;
        let (lo, hi) = (lo.to_key_bytes(), hi.to_key_bytes());
        let prefix = self.schema.index_entry(state.namespace(), index, &[], &[]);

        let hits = state
            .scan(&prefix)?
            .into_iter()
            .filter(|(k, _)| k.user_key.as_slice() >= lo.as_slice() && k.user_key.as_slice() < hi.as_slice())
            .collect();
        Self::decode_keys(hits)
    }

    /// Every primary key in index order (indexed value, then primary key)
    pub fn scan_index<S: StateAccess + ?Sized>(&self, state: &S, index: &str) -> Result<Vec<K>> {
        let index = self.schema.index(index)?;
        let prefix = self.schema.index_entry(state.namespace(), index, &[], &[]);
        Self::decode_keys(state.scan(&prefix)?)
    }
}
