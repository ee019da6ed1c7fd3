//! Declared shape of a table
//!
//! A [`TableLayout`] is the part of a table declaration that decides where
//! its entries live: the table name and its secondary indices in
//! declaration order, each with the type of value it holds. Two handles on
//! the same table maintain the same index entries only if their layouts
//! are equal, so a contract's registered layouts are the reference every
//! write is checked against.

use std::any::TypeId;

use crate::error::{Error, Result};
use crate::types::{Key, KeySpace};

/// One secondary index as declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
    /// Declared index name
    pub name: String,
    /// Type of the indexed value
    pub value_type: TypeId,
    /// Printable form of `value_type`
    pub value_type_name: &'static str,
}

/// Name and ordered secondary indices of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Declared table name
    pub name: String,
    /// Secondary indices; position is the index's key space id
    pub indices: Vec<IndexLayout>,
}

impl TableLayout {
    /// Names of the secondary indices in declaration order
    pub fn index_names(&self) -> Vec<String> {
        self.indices.iter().map(|i| i.name.clone()).collect()
    }

    /// Fail unless `key` addresses a space this table declares
    pub fn check_key(&self, key: &Key) -> Result<()> {
        match key.space {
            KeySpace::Primary => Ok(()),
            KeySpace::Index(id) if usize::from(id) < self.indices.len() => Ok(()),
            KeySpace::Index(id) => Err(Error::SchemaError(format!(
                "Table '{}' declares {} indices, key addresses index {}",
                self.name,
                self.indices.len(),
                id
            ))),
        }
    }

    /// Fail unless `other` declares exactly the same table
    pub fn check_matches(&self, other: &TableLayout) -> Result<()> {
        if self != other {
            return Err(Error::SchemaError(format!(
                "Table '{}' is declared with indices {:?}, handle uses {:?}",
                self.name,
                describe(&self.indices),
                describe(&other.indices)
            )));
        }
        Ok(())
    }
}

fn describe(indices: &[IndexLayout]) -> Vec<String> {
    indices
        .iter()
        .map(|i| format!("{}: {}", i.name, i.value_type_name))
        .collect()
}
