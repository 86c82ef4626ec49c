//! Column definition for Strata schemas.

use crate::types::KeyType;
use serde::{Deserialize, Serialize};

/// A column definition in a table schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    name: String,
    /// Declared type of the column.
    key_type: KeyType,
    /// Column position in the table (0-based).
    index: usize,
}

impl Column {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
            index: 0,
        }
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[inline]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Returns the column position.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}
