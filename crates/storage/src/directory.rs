//! The ordered page directory of a table.
//!
//! Entries are sorted by key range: every key stored on page `i` is smaller
//! than every key stored on page `i + 1`, and each entry caches the first and
//! last primary key of its page. Page ids are handed out monotonically and
//! never reused, so removing a page never invalidates another page's id.

use serde::{Deserialize, Serialize};
use strata_core::{CompareOp, PageId, TupleLocator, Value};

/// One page's id and cached key bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    pub id: PageId,
    pub min: Value,
    pub max: Value,
}

impl PageEntry {
    pub fn new(id: PageId, min: Value, max: Value) -> Self {
        Self { id, min, max }
    }

    /// Returns true if a key `k` on this page could satisfy `k <op> value`.
    pub fn may_match(&self, op: CompareOp, value: &Value) -> bool {
        match op {
            CompareOp::Eq => &self.min <= value && value <= &self.max,
            CompareOp::Lt => &self.min < value,
            CompareOp::Le => &self.min <= value,
            CompareOp::Gt => &self.max > value,
            CompareOp::Ge => &self.max >= value,
            CompareOp::Ne => !(&self.min == value && &self.max == value),
        }
    }
}

/// Page directory: page ids in key order plus their bounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDirectory {
    entries: Vec<PageEntry>,
    next_id: PageId,
}

impl PageDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&PageEntry> {
        self.entries.get(pos)
    }

    /// Page ids in key order.
    pub fn page_ids(&self) -> Vec<PageId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Cached `(min, max)` bounds in key order.
    pub fn page_bounds(&self) -> Vec<(Value, Value)> {
        self.entries
            .iter()
            .map(|e| (e.min.clone(), e.max.clone()))
            .collect()
    }

    /// Directory position of the page a locator points at, found by binary
    /// search on its primary key. `None` if that page does not hold the key's
    /// range.
    pub fn position_of(&self, locator: &TupleLocator) -> Option<usize> {
        self.locate(&locator.primary_key)
            .filter(|&pos| self.entries[pos].id == locator.page_id)
    }

    /// Position of the page whose range a key belongs to: the last page whose
    /// minimum is not greater than `key`, or the first page when `key` sorts
    /// before everything. `None` on an empty directory.
    pub fn locate(&self, key: &Value) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let after = self.entries.partition_point(|e| &e.min <= key);
        Some(after.saturating_sub(1))
    }

    /// Ids of the pages that may hold a key satisfying `key <op> value`.
    pub fn candidates(&self, op: CompareOp, value: &Value) -> Vec<PageId> {
        self.entries
            .iter()
            .filter(|e| e.may_match(op, value))
            .map(|e| e.id)
            .collect()
    }

    /// Reserves a fresh page id.
    pub fn allocate_id(&mut self) -> PageId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Inserts an entry at `pos`.
    pub fn insert(&mut self, pos: usize, entry: PageEntry) {
        self.entries.insert(pos, entry);
    }

    /// Refreshes the cached bounds of the page at `pos`.
    pub fn set_bounds(&mut self, pos: usize, min: Value, max: Value) {
        if let Some(entry) = self.entries.get_mut(pos) {
            entry.min = min;
            entry.max = max;
        }
    }

    /// Removes the entry at `pos`.
    pub fn remove(&mut self, pos: usize) -> PageEntry {
        self.entries.remove(pos)
    }

    /// Removes every entry. Page ids keep increasing.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
