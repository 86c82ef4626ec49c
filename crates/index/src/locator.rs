//! Index specialization for tuple locators.

use crate::btree::BTreeIndex;
use strata_core::{PageId, TupleLocator, Value};

/// An index from column values to the tuples holding them.
pub type LocatorIndex = BTreeIndex<Value, TupleLocator>;

impl BTreeIndex<Value, TupleLocator> {
    /// Returns the page a new primary key should be placed on: the page of the
    /// largest entry below `key`, or of the smallest entry when `key` sorts
    /// first. `None` on an empty index.
    pub fn page_number_for_insert(&self, key: &Value) -> Option<PageId> {
        self.insert_neighbor(key).map(|loc| loc.page_id)
    }

    /// Locator of the entry [`page_number_for_insert`](Self::page_number_for_insert)
    /// takes its page from.
    pub fn insert_neighbor(&self, key: &Value) -> Option<&TupleLocator> {
        self.predecessor(key)
            .map(|(_, loc)| loc)
            .or_else(|| self.min().and_then(|(_, locs)| locs.first()))
    }
}
