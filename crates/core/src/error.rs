//! Error types for Strata.

use crate::types::KeyType;
use crate::value::Value;
use thiserror::Error;

/// Result type alias for Strata operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Strata storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid schema definition or malformed input.
    #[error("Schema violation: {message}")]
    SchemaViolation { message: String },

    /// A value's type does not match its column.
    #[error("Type mismatch on column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: KeyType,
        got: KeyType,
    },

    /// Column not found.
    #[error("Column {column} not found in table {table}")]
    UnknownColumn { table: String, column: String },

    /// A tuple without its primary key value.
    #[error("Primary key column {column} is missing")]
    MissingPrimaryKey { column: String },

    /// Primary key already stored.
    #[error("Duplicate primary key: {key}")]
    DuplicateKey { key: Value },

    /// Primary key not stored.
    #[error("Key not found: {key}")]
    KeyNotFound { key: Value },

    /// Page at capacity. Resolved internally by cascading shift.
    #[error("Page {page} is full")]
    PageFull { page: u64 },

    /// Comparison operator outside `<, <=, >, >=, !=, =`.
    #[error("Invalid operator: {0} (supported: <, <=, >, >=, !=, =)")]
    InvalidOperator(String),

    /// Combinator outside `AND, OR, XOR`.
    #[error("Invalid combinator: {0} (supported: AND, OR, XOR)")]
    InvalidCombinator(String),

    /// Malformed query input.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// An update tried to change the primary key.
    #[error("Primary key column {column} cannot be updated")]
    PrimaryKeyImmutable { column: String },

    /// An update carries more columns than the table can change.
    #[error("Too many columns: got {given}, at most {max} can be updated")]
    TooManyColumns { given: usize, max: usize },

    /// Index already built on the column.
    #[error("Index already exists on column {column}")]
    IndexAlreadyExists { column: String },

    /// Table not found.
    #[error("Table not found: {name}")]
    TableNotFound { name: String },

    /// Page missing from the persistence layer.
    #[error("Page {page} not found in table {table}")]
    PageNotFound { table: String, page: u64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// I/O failure in the persistence layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failure in the persistence layer.
    #[error("Codec error: {0}")]
    Codec(String),
}

impl Error {
    /// Creates a schema violation error.
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Error::SchemaViolation {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: KeyType, got: KeyType) -> Self {
        Error::TypeMismatch {
            column: column.into(),
            expected,
            got,
        }
    }

    /// Creates an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(key: Value) -> Self {
        Error::DuplicateKey { key }
    }

    /// Creates a key not found error.
    pub fn key_not_found(key: Value) -> Self {
        Error::KeyNotFound { key }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Error::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates a page not found error.
    pub fn page_not_found(table: impl Into<String>, page: u64) -> Self {
        Error::PageNotFound {
            table: table.into(),
            page,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl core::fmt::Display) -> Self {
        Error::Codec(message.to_string())
    }

    /// Returns true for caller errors detected before any mutation.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Error::PageFull { .. } | Error::PageNotFound { .. } | Error::Io(_) | Error::Codec(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch("gpa", KeyType::Float, KeyType::Text);
        assert!(err.to_string().contains("Type mismatch"));
        assert!(err.to_string().contains("gpa"));

        let err = Error::unknown_column("Student", "grade");
        assert!(err.to_string().contains("grade"));

        let err = Error::duplicate_key(Value::Int(7));
        assert_eq!(err.to_string(), "Duplicate primary key: 7");
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::key_not_found(Value::from("abc"));
        match err {
            Error::KeyNotFound { key } => assert_eq!(key, Value::from("abc")),
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::PrimaryKeyImmutable { column: "id".into() }.is_validation());
        assert!(Error::InvalidOperator("<>".into()).is_validation());
        assert!(!Error::PageFull { page: 1 }.is_validation());
        assert!(!Error::codec("truncated").is_validation());
    }
}
