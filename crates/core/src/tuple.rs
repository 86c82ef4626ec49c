//! Tuple structure for Strata.
//!
//! This module defines the `Tuple` struct which represents a single record in a table.

use crate::value::Value;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// A record in a table: an ordered map from column name to value.
///
/// The primary key is not stored separately; it is simply the value under the
/// table's primary key column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    values: BTreeMap<String, Value>,
}

impl Tuple {
    /// Creates an empty tuple.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column value, consuming and returning the tuple.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Gets the value of a column.
    #[inline]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Sets the value of a column, returning the previous value if any.
    pub fn set(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(column.into(), value)
    }

    /// Removes a column value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    /// Returns true if the tuple carries a value for the column.
    #[inline]
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Returns the primary key value under the given key column.
    #[inline]
    pub fn primary_key(&self, key_column: &str) -> Option<&Value> {
        self.values.get(key_column)
    }

    /// Iterates over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Iterates over the column names present in this tuple.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of values in this tuple.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this tuple has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Tuple {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (column, value) in &self.values {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", column, value)?;
            first = false;
        }
        Ok(())
    }
}
