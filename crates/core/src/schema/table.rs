//! Table definition for Strata schemas.

use super::column::Column;
use crate::error::{Error, Result};
use crate::tuple::Tuple;
use crate::types::KeyType;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A table definition: ordered typed columns and one primary key column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    name: String,
    /// Column definitions, in declaration order.
    columns: Vec<Column>,
    /// Name of the primary key column.
    primary_key: String,
}

impl TableSchema {
    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns true if the table declares the column.
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the primary key column name.
    #[inline]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the primary key column's type.
    pub fn primary_key_type(&self) -> KeyType {
        self.get_column(&self.primary_key)
            .map(Column::key_type)
            .unwrap_or(KeyType::Int)
    }

    /// Resolves a column, or fails with `UnknownColumn`.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get_column(name)
            .ok_or_else(|| Error::unknown_column(&self.name, name))
    }

    /// Checks that `value` may be stored under `column`.
    pub fn check_value(&self, column: &str, value: &Value) -> Result<()> {
        let col = self.column(column)?;
        if !col.key_type().matches(value) {
            return Err(Error::type_mismatch(column, col.key_type(), value.key_type()));
        }
        Ok(())
    }

    /// Validates a tuple for insertion: the primary key must be present and
    /// every carried column must be declared with a matching type.
    /// Non-key columns may be absent.
    pub fn validate_tuple(&self, tuple: &Tuple) -> Result<()> {
        if !tuple.contains(&self.primary_key) {
            return Err(Error::MissingPrimaryKey {
                column: self.primary_key.clone(),
            });
        }
        for (column, value) in tuple {
            self.check_value(column, value)?;
        }
        Ok(())
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<String>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            primary_key: None,
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::schema_violation("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::schema_violation(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::schema_violation(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Adds a column to the table.
    pub fn add_column(mut self, name: impl Into<String>, key_type: KeyType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::schema_violation(format!(
                "Column already exists: {}",
                name
            )));
        }
        let index = self.columns.len();
        self.columns.push(Column::new(name, key_type).with_index(index));
        Ok(self)
    }

    /// Sets the primary key column.
    pub fn primary_key(mut self, column: &str) -> Result<Self> {
        if !self.columns.iter().any(|c| c.name() == column) {
            return Err(Error::schema_violation(format!(
                "Column not found: {}",
                column
            )));
        }
        self.primary_key = Some(column.into());
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<TableSchema> {
        let primary_key = self.primary_key.ok_or_else(|| {
            Error::schema_violation(format!("Table {} has no primary key", self.name))
        })?;
        Ok(TableSchema {
            name: self.name,
            columns: self.columns,
            primary_key,
        })
    }
}
