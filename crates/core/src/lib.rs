//! Strata Core - Core types and schema definitions for the Strata storage engine.
//!
//! This crate provides the foundational types shared by every layer:
//!
//! - `KeyType`: Supported column types (Int, Float, Text)
//! - `Value`: Runtime values stored in tuples and used as index keys
//! - `Tuple`: A record keyed by column name
//! - `TupleLocator`: Page id plus primary key, stored as index values
//! - `CompareOp`: Comparison operators (<, <=, >, >=, !=, =)
//! - `schema`: Schema definitions (Column, TableSchema, TableBuilder)
//! - `config`: Storage configuration
//! - `Error`: Error types for storage operations
//!
//! # Example
//!
//! ```rust
//! use strata_core::{KeyType, Tuple, Value};
//! use strata_core::schema::TableBuilder;
//!
//! let table = TableBuilder::new("Student")
//!     .unwrap()
//!     .add_column("id", KeyType::Int)
//!     .unwrap()
//!     .add_column("name", KeyType::Text)
//!     .unwrap()
//!     .primary_key("id")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let tuple = Tuple::new().with("id", 1).with("name", "Alice");
//! assert!(table.validate_tuple(&tuple).is_ok());
//! assert_eq!(tuple.get("name"), Some(&Value::from("Alice")));
//! ```

pub mod config;
mod error;
mod locator;
mod op;
pub mod schema;
mod tuple;
mod types;
mod value;

pub use config::StorageConfig;
pub use error::{Error, Result};
pub use locator::{PageId, TupleLocator};
pub use op::CompareOp;
pub use tuple::Tuple;
pub use types::KeyType;
pub use value::Value;
