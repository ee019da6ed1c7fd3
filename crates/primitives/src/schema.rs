//! Table declarations and index maintenance
//!
//! A [`TableSchema`] is built once per table: a name, one primary-key
//! adapter and an ordered list of secondary-index adapters. Each adapter is
//! a pure function from record to key. The schema also computes the index
//! entries for a record and the stale/fresh entry sets for an update, which
//! is everything the table layer needs to keep every secondary index
//! consistent with the primary entries.
//!
//! ## Key layout
//!
//! - primary:   `Key::primary(ns, table, enc(pk))` → encoded record
//! - index `n`: `Key::index(ns, table, n, enc(value) ‖ enc(pk))` → encoded pk

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use tessera_core::{Error, IndexLayout, Key, KeyEncode, Name, Result, TableLayout};

type PrimaryFn<R, K> = Arc<dyn Fn(&R) -> K + Send + Sync>;
type IndexFn<R> = Arc<dyn Fn(&R) -> Vec<u8> + Send + Sync>;

/// Most secondary indices one table can declare
pub const MAX_SECONDARY_INDICES: usize = u8::MAX as usize + 1;

/// One declared secondary index
pub struct SecondaryIndex<R> {
    name: String,
    id: u8,
    value_type: TypeId,
    value_type_name: &'static str,
    extract: IndexFn<R>,
}

impl<R> SecondaryIndex<R> {
    /// Declared index name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in declaration order, used as the key space id
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Name and value type of this index
    pub fn layout(&self) -> IndexLayout {
        IndexLayout {
            name: self.name.clone(),
            value_type: self.value_type,
            value_type_name: self.value_type_name,
        }
    }

    /// Encoded indexed value of `record`
    pub fn value_bytes(&self, record: &R) -> Vec<u8> {
        (self.extract)(record)
    }

    /// Fail unless `V` is the type this index was declared with
    pub fn check_value_type<V: 'static>(&self, table: &str) -> Result<()> {
        if TypeId::of::<V>() != self.value_type {
            return Err(Error::InvalidOperation(format!(
                "Index '{}' of table '{}' holds {} values, queried with {}",
                self.name,
                table,
                self.value_type_name,
                type_name::<V>()
            )));
        }
        Ok(())
    }
}

/// Index entries to drop and to add for one update
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IndexDiff {
    /// Entries derived from the old field values
    pub stale: Vec<Key>,
    /// Entries derived from the new field values
    pub fresh: Vec<Key>,
}

impl IndexDiff {
    /// True when no indexed field changed
    pub fn is_empty(&self) -> bool {
        self.stale.is_empty() && self.fresh.is_empty()
    }
}

/// Declaration of a table with record type `R` and primary key `K`
pub struct TableSchema<R, K> {
    name: String,
    primary: PrimaryFn<R, K>,
    secondaries: Vec<SecondaryIndex<R>>,
}

impl<R, K> TableSchema<R, K>
where
    R: 'static,
    K: KeyEncode + 'static,
{
    /// A table with no secondary indices
    pub fn new<F>(name: impl Into<String>, primary: F) -> Self
    where
        F: Fn(&R) -> K + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            primary: Arc::new(primary),
            secondaries: Vec::new(),
        }
    }

    /// Start declaring a table
    ///
    /// ```rust,ignore
    /// let schema = TableSchema::builder("table_greetings", |g: &Greeting| g.name.clone())
    ///     .secondary("count", |g: &Greeting| g.count)
    ///     .secondary("last_seen", |g: &Greeting| g.last_seen)
    ///     .build()?;
    /// ```
    pub fn builder<F>(name: impl Into<String>, primary: F) -> TableSchemaBuilder<R, K>
    where
        F: Fn(&R) -> K + Send + Sync + 'static,
    {
        TableSchemaBuilder {
            schema: Self::new(name, primary),
            error: None,
        }
    }

    /// Declared table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key of `record`
    pub fn primary_key(&self, record: &R) -> K {
        (self.primary)(record)
    }

    /// Secondary indices in declaration order
    pub fn secondaries(&self) -> &[SecondaryIndex<R>] {
        &self.secondaries
    }

    /// Names of the secondary indices in declaration order
    pub fn index_names(&self) -> Vec<String> {
        self.secondaries.iter().map(|s| s.name.clone()).collect()
    }

    /// Name and ordered index layouts of this declaration
    pub fn layout(&self) -> TableLayout {
        TableLayout {
            name: self.name.clone(),
            indices: self.secondaries.iter().map(SecondaryIndex::layout).collect(),
        }
    }

    /// Look up a secondary index by name
    pub fn index(&self, name: &str) -> Result<&SecondaryIndex<R>> {
        self.secondaries
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownIndex {
                table: self.name.clone(),
                index: name.to_string(),
            })
    }

    /// Storage key of the primary entry for encoded key `pk`
    pub fn primary_entry(&self, namespace: &Name, pk: &[u8]) -> Key {
        Key::primary(namespace.clone(), self.name.clone(), pk.to_vec())
    }

    /// Storage key of index `index`'s entry for encoded value and key
    pub fn index_entry(&self, namespace: &Name, index: &SecondaryIndex<R>, value: &[u8], pk: &[u8]) -> Key {
        let mut user_key = Vec::with_capacity(value.len() + pk.len());
        user_key.extend_from_slice(value);
        user_key.extend_from_slice(pk);
        Key::index(namespace.clone(), self.name.clone(), index.id, user_key)
    }

    /// One entry per secondary index for `record`
    pub fn index_entries(&self, namespace: &Name, record: &R, pk: &[u8]) -> Vec<Key> {
        self.secondaries
            .iter()
            .map(|index| self.index_entry(namespace, index, &index.value_bytes(record), pk))
            .collect()
    }

    /// Entries to replace when `old` becomes `new` under the same key
    ///
    /// Only indices whose encoded value changed appear in the diff.
    pub fn diff_index_entries(&self, namespace: &Name, old: &R, new: &R, pk: &[u8]) -> IndexDiff {
        let mut diff = IndexDiff::default();
        for index in &self.secondaries {
            let before = index.value_bytes(old);
            let after = index.value_bytes(new);
            if before != after {
                diff.stale.push(self.index_entry(namespace, index, &before, pk));
                diff.fresh.push(self.index_entry(namespace, index, &after, pk));
            }
        }
        diff
    }
}

impl<R, K> fmt::Debug for TableSchema<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSchema")
            .field("name", &self.name)
            .field(
                "secondaries",
                &self.secondaries.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder returned by [`TableSchema::builder`]
pub struct TableSchemaBuilder<R, K> {
    schema: TableSchema<R, K>,
    error: Option<Error>,
}

impl<R, K> TableSchemaBuilder<R, K>
where
    R: 'static,
    K: KeyEncode + 'static,
{
    /// Declare the next secondary index
    pub fn secondary<V, F>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        V: KeyEncode + 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        let count = self.schema.secondaries.len();

        if self.schema.secondaries.iter().any(|s| s.name == name) {
            self.error = Some(Error::SchemaError(format!(
                "Table '{}' declares index '{}' twice",
                self.schema.name, name
            )));
            return self;
        }
        let id = match u8::try_from(count) {
            Ok(id) => id,
            Err(_) => {
                self.error = Some(Error::SchemaError(format!(
                    "Table '{}' declares more than {} indices",
                    self.schema.name, MAX_SECONDARY_INDICES
                )));
                return self;
            }
        };

        self.schema.secondaries.push(SecondaryIndex {
            name,
            id,
            value_type: TypeId::of::<V>(),
            value_type_name: type_name::<V>(),
            extract: Arc::new(move |record: &R| extract(record).to_key_bytes()),
        });
        self
    }

    /// Finish the declaration
    pub fn build(self) -> Result<TableSchema<R, K>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Greeting {
        name: Name,
        count: u32,
        last_seen: u64,
    }

    fn schema() -> TableSchema<Greeting, Name> {
        TableSchema::builder("table_greetings", |g: &Greeting| g.name.clone())
            .secondary("count", |g: &Greeting| g.count)
            .secondary("last_seen", |g: &Greeting| g.last_seen)
            .build()
            .unwrap()
    }

    #[test]
    fn test_index_ids_follow_declaration_order() {
        let schema = schema();
        assert_eq!(schema.index("count").unwrap().id(), 0);
        assert_eq!(schema.index("last_seen").unwrap().id(), 1);
        assert_eq!(schema.index_names(), vec!["count", "last_seen"]);
    }

    #[test]
    fn test_unknown_index() {
        assert!(matches!(
            schema().index("missing"),
            Err(Error::UnknownIndex { .. })
        ));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let result = TableSchema::builder("t", |g: &Greeting| g.name.clone())
            .secondary("count", |g: &Greeting| g.count)
            .secondary("count", |g: &Greeting| g.last_seen)
            .build();
        assert!(matches!(result, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_index_entries_one_per_index() {
        let schema = schema();
        let ns = Name::new("hello");
        let g = Greeting {
            name: Name::new("alice"),
            count: 1,
            last_seen: 5,
        };
        let pk = g.name.to_key_bytes();
        let entries = schema.index_entries(&ns, &g, &pk);

        assert_eq!(entries.len(), 2);
        let mut expected = 1u32.to_key_bytes();
        expected.extend_from_slice(&pk);
        assert_eq!(entries[0], Key::index(ns.clone(), "table_greetings", 0, expected));
    }

    #[test]
    fn test_diff_only_changed_indices() {
        let schema = schema();
        let ns = Name::new("hello");
        let old = Greeting {
            name: Name::new("alice"),
            count: 1,
            last_seen: 5,
        };
        let mut new = old.clone();
        new.count = 2;
        let pk = old.name.to_key_bytes();

        let diff = schema.diff_index_entries(&ns, &old, &new, &pk);
        assert_eq!(diff.stale.len(), 1);
        assert_eq!(diff.fresh.len(), 1);
        assert_eq!(diff.stale[0].space, tessera_core::KeySpace::Index(0));

        assert!(schema.diff_index_entries(&ns, &old, &old, &pk).is_empty());
    }

    #[test]
    fn test_layout_follows_declaration() {
        let layout = schema().layout();
        assert_eq!(layout.name, "table_greetings");
        assert_eq!(layout.index_names(), vec!["count", "last_seen"]);
        assert_eq!(layout.indices[0].value_type, TypeId::of::<u32>());
        assert_eq!(layout, schema().layout());

        let bare = TableSchema::new("table_greetings", |g: &Greeting| g.name.clone());
        assert!(layout.check_matches(&bare.layout()).is_err());
    }

    #[test]
    fn test_value_type_check() {
        let schema = schema();
        let count = schema.index("count").unwrap();
        assert!(count.check_value_type::<u32>("t").is_ok());
        assert!(count.check_value_type::<u64>("t").is_err());
    }
}
