//! B+Tree index implementation for Strata.
//!
//! This module provides an arena-backed B+Tree for point and range queries.

mod iter;
mod node;
mod tree;

pub use iter::BTreeIterator;
pub use node::{Node, NodeId};
pub use tree::{BTreeIndex, DEFAULT_ORDER, MIN_ORDER};
