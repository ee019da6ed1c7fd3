//! Per-contract table declarations
//!
//! A contract lists every table and singleton it owns in a
//! [`SchemaRegistry`]. The registry is built once at deploy time and
//! rejects empty or duplicate names, so two declarations can never share a
//! key space inside one namespace. While the contract runs, every write is
//! checked against it: keys must address a declared table and one of its
//! declared spaces, and table handles must carry the declared layout.

use std::collections::BTreeMap;

use tessera_core::{Error, Key, Record, Result, TableLayout};

use crate::singleton::Singleton;
use crate::table::{Table, TableKey};

/// Kind of a declared store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Keyed table with optional secondary indices
    Table,
    /// Single-record table
    Singleton,
}

/// Shape of one declared store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// Table or singleton
    pub kind: TableKind,
    /// Name and ordered secondary indices
    pub layout: TableLayout,
}

impl TableInfo {
    /// Declared name
    pub fn name(&self) -> &str {
        &self.layout.name
    }

    /// Secondary index names in declaration order
    pub fn index_names(&self) -> Vec<String> {
        self.layout.index_names()
    }
}

/// Validated set of declarations for one contract
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableInfo>,
}

impl SchemaRegistry {
    /// Start a registry
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// A registry with no declarations
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declaration named `name`
    pub fn get(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    /// Declaration named `name`, or `SchemaError` if there is none
    pub fn declared(&self, name: &str) -> Result<&TableInfo> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::SchemaError(format!("Table '{}' is not declared", name)))
    }

    /// Fail unless `key` lies in a declared table and a declared space of it
    pub fn check_key(&self, key: &Key) -> Result<()> {
        self.declared(&key.table)?.layout.check_key(key)
    }

    /// Fail unless `layout` equals the declaration of the same name
    pub fn check_layout(&self, layout: &TableLayout) -> Result<()> {
        self.declared(&layout.name)?.layout.check_matches(layout)
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Declarations ordered by name
    pub fn iter(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }
}

/// Builder returned by [`SchemaRegistry::builder`]
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    entries: Vec<TableInfo>,
}

impl SchemaRegistryBuilder {
    /// Declare a table
    pub fn table<R: Record, K: TableKey>(mut self, table: &Table<R, K>) -> Self {
        self.entries.push(TableInfo {
            kind: TableKind::Table,
            layout: table.layout().clone(),
        });
        self
    }

    /// Declare a singleton
    pub fn singleton<R: Record>(mut self, singleton: &Singleton<R>) -> Self {
        self.entries.push(TableInfo {
            kind: TableKind::Singleton,
            layout: singleton.layout().clone(),
        });
        self
    }

    /// Validate and finish
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut tables = BTreeMap::new();
        for info in self.entries {
            if info.name().is_empty() {
                return Err(Error::SchemaError("Table name cannot be empty".to_string()));
            }
            if tables.contains_key(info.name()) {
                return Err(Error::SchemaError(format!(
                    "Table '{}' is declared more than once",
                    info.name()
                )));
            }
            tables.insert(info.name().to_string(), info);
        }
        Ok(SchemaRegistry { tables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;
    use serde::{Deserialize, Serialize};
    use tessera_core::{KeySpace, Name};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Greeting {
        name: Name,
        count: u32,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Stats {
        visits: u32,
    }

    fn greetings(name: &str) -> Table<Greeting, Name> {
        Table::new(
            TableSchema::builder(name, |g: &Greeting| g.name.clone())
                .secondary("count", |g: &Greeting| g.count)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_registry_describes_declarations() {
        let registry = SchemaRegistry::builder()
            .table(&greetings("table_greetings"))
            .singleton(&Singleton::<Stats>::new("global_counters"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        let info = registry.get("table_greetings").unwrap();
        assert_eq!(info.kind, TableKind::Table);
        assert_eq!(info.index_names(), vec!["count"]);
        assert_eq!(
            registry.get("global_counters").unwrap().kind,
            TableKind::Singleton
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = SchemaRegistry::builder()
            .table(&greetings("hello"))
            .singleton(&Singleton::<Stats>::new("hello"))
            .build();
        assert!(matches!(result, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = SchemaRegistry::builder().table(&greetings("")).build();
        assert!(matches!(result, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_writes_checked_against_declarations() {
        let registry = SchemaRegistry::builder()
            .table(&greetings("table_greetings"))
            .singleton(&Singleton::<Stats>::new("global_counters"))
            .build()
            .unwrap();
        let ns = Name::new("hello");

        assert!(registry
            .check_key(&Key::index(ns.clone(), "table_greetings", 0, vec![]))
            .is_ok());
        assert!(registry
            .check_key(&Key::primary(ns.clone(), "global_counters", vec![]))
            .is_ok());
        assert!(matches!(
            registry.check_key(&Key::new(ns.clone(), "table_greetings", KeySpace::Index(1), vec![])),
            Err(Error::SchemaError(_))
        ));
        assert!(matches!(
            registry.check_key(&Key::index(ns.clone(), "global_counters", 0, vec![])),
            Err(Error::SchemaError(_))
        ));
        assert!(matches!(
            registry.check_key(&Key::primary(ns, "not_declared", vec![])),
            Err(Error::SchemaError(_))
        ));

        assert!(registry.check_layout(greetings("table_greetings").layout()).is_ok());
        let bare: Table<Greeting, Name> =
            Table::new(TableSchema::new("table_greetings", |g: &Greeting| g.name.clone()));
        assert!(registry.check_layout(bare.layout()).is_err());
        assert!(registry.check_layout(greetings("elsewhere").layout()).is_err());
    }
}
