//! Strata Query - Predicate evaluation over Strata tables.
//!
//! This crate provides:
//!
//! - `Term`: A `table.column <op> value` predicate
//! - `Combinator`: `AND`, `OR` and `XOR` between adjacent terms
//! - `ResultSet`: Tuples keyed by primary key with set algebra
//! - `QueryEvaluator`: Access path selection and result folding
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_core::schema::TableBuilder;
//! use strata_core::{KeyType, StorageConfig, Tuple};
//! use strata_query::{Combinator, QueryEvaluator, Term};
//! use strata_storage::{MemoryStore, TableStore};
//!
//! let schema = TableBuilder::new("Student")
//!     .unwrap()
//!     .add_column("id", KeyType::Int)
//!     .unwrap()
//!     .add_column("gpa", KeyType::Float)
//!     .unwrap()
//!     .primary_key("id")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let mut table =
//!     TableStore::create(schema, StorageConfig::default(), Arc::new(MemoryStore::new())).unwrap();
//! for (id, gpa) in [(1, 3.5), (2, 2.0), (3, 3.9)] {
//!     table.insert(Tuple::new().with("id", id).with("gpa", gpa)).unwrap();
//! }
//! table.create_index("gpa").unwrap();
//!
//! let terms = [
//!     Term::parse("Student", "gpa", ">", 3.0).unwrap(),
//!     Term::parse("Student", "id", "!=", 3).unwrap(),
//! ];
//! let combinators = ["and".parse::<Combinator>().unwrap()];
//! let rows = QueryEvaluator::new(&table).evaluate(&terms, &combinators).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

mod evaluator;
mod result_set;
mod term;

pub use evaluator::{AccessPath, QueryEvaluator};
pub use result_set::ResultSet;
pub use term::{Combinator, Term};
