//! Schema module for Strata.
//!
//! This module contains the column and table definitions the storage layer
//! validates tuples against.

mod column;
mod table;

pub use column::Column;
pub use table::{TableBuilder, TableSchema};
