//! Fixed-capacity pages of tuples sorted by primary key.

use core::fmt;
use serde::{Deserialize, Serialize};
use strata_core::{Error, PageId, Result, Tuple, Value};

/// A page of tuples.
///
/// Tuples are kept strictly ascending by the value of the key column, so a
/// page never holds two tuples with the same primary key and its first and
/// last tuples carry its bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    id: PageId,
    capacity: usize,
    key_column: String,
    tuples: Vec<Tuple>,
}

impl Page {
    /// Creates an empty page.
    pub fn new(id: PageId, capacity: usize, key_column: impl Into<String>) -> Self {
        Self {
            id,
            capacity,
            key_column: key_column.into(),
            tuples: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> PageId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.tuples.len() >= self.capacity
    }

    /// Returns the tuples in key order.
    #[inline]
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Consumes the page, returning its tuples in key order.
    pub fn into_tuples(self) -> Vec<Tuple> {
        self.tuples
    }

    fn key_of<'a>(&self, tuple: &'a Tuple) -> Option<&'a Value> {
        tuple.get(&self.key_column)
    }

    /// Binary search by primary key: `Ok(index)` if present, `Err(insertion point)` otherwise.
    fn position(&self, key: &Value) -> core::result::Result<usize, usize> {
        self.tuples.binary_search_by(|t| match self.key_of(t) {
            Some(k) => k.cmp(key),
            None => core::cmp::Ordering::Less,
        })
    }

    /// Returns the index of the tuple with `key`, if present.
    pub fn binary_search(&self, key: &Value) -> Option<usize> {
        self.position(key).ok()
    }

    /// Gets the tuple with `key`.
    pub fn get(&self, key: &Value) -> Option<&Tuple> {
        self.binary_search(key).map(|i| &self.tuples[i])
    }

    /// Gets a mutable reference to the tuple with `key`. Callers must not
    /// change the key column.
    pub(crate) fn get_mut(&mut self, key: &Value) -> Option<&mut Tuple> {
        match self.binary_search(key) {
            Some(i) => Some(&mut self.tuples[i]),
            None => None,
        }
    }

    /// Inserts a tuple at its sorted position and returns that position.
    pub fn insert(&mut self, tuple: Tuple) -> Result<usize> {
        if self.is_full() {
            return Err(Error::PageFull { page: self.id });
        }
        let key = match self.key_of(&tuple) {
            Some(key) => key,
            None => {
                return Err(Error::MissingPrimaryKey {
                    column: self.key_column.clone(),
                })
            }
        };
        match self.position(key) {
            Ok(_) => Err(Error::duplicate_key(key.clone())),
            Err(pos) => {
                self.tuples.insert(pos, tuple);
                Ok(pos)
            }
        }
    }

    /// Removes and returns the tuple with `key`.
    pub fn delete(&mut self, key: &Value) -> Result<Tuple> {
        match self.position(key) {
            Ok(pos) => Ok(self.tuples.remove(pos)),
            Err(_) => Err(Error::key_not_found(key.clone())),
        }
    }

    /// Removes and returns the tuple with the largest key.
    pub fn remove_last(&mut self) -> Option<Tuple> {
        self.tuples.pop()
    }

    /// Returns the `column` values of the first and last tuples.
    pub fn min_max(&self, column: &str) -> Option<(&Value, &Value)> {
        let first = self.tuples.first()?.get(column)?;
        let last = self.tuples.last()?.get(column)?;
        Some((first, last))
    }

    /// Returns the smallest and largest primary keys.
    pub fn key_bounds(&self) -> Option<(&Value, &Value)> {
        self.min_max(&self.key_column)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page {} ({}/{})", self.id, self.tuples.len(), self.capacity)?;
        for tuple in &self.tuples {
            writeln!(f, "  {}", tuple)?;
        }
        Ok(())
    }
}
