//! Strata Index - B+Tree index for the Strata storage engine.
//!
//! - `BTreeIndex`: arena-backed B+Tree with point, range and operator queries
//! - `KeyRange`: key intervals driving index scans
//! - `LocatorIndex`: the `Value -> TupleLocator` tree used by tables
//!
//! # Example
//!
//! ```rust
//! use strata_core::CompareOp;
//! use strata_index::{BTreeIndex, KeyRange};
//!
//! let mut btree: BTreeIndex<i32, u64> = BTreeIndex::new(64, true);
//! btree.insert(10, 100);
//! btree.insert(20, 200);
//! btree.insert(5, 50);
//!
//! // Point query
//! assert_eq!(btree.search(&10), Some(&100));
//!
//! // Range query
//! assert_eq!(btree.range(&5, &10), vec![50, 100]);
//! assert_eq!(btree.operator(&10, CompareOp::Gt), vec![200]);
//!
//! let above: Vec<u64> = btree.scan(KeyRange::lower_bound(10, false)).map(|(_, v)| *v).collect();
//! assert_eq!(above, vec![100, 200]);
//! ```

pub mod btree;
mod locator;
pub mod range;

pub use btree::{BTreeIndex, BTreeIterator};
pub use locator::LocatorIndex;
pub use range::KeyRange;
