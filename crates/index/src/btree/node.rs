//! B+Tree node definitions.

use serde::{Deserialize, Serialize};

/// Node identifier in the B+Tree arena.
pub type NodeId = usize;

/// A node in the B+Tree.
///
/// Leaves hold one slot per distinct key; every value stored under that key
/// lives in the slot's value list, so duplicates never span leaves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node<K, V> {
    /// Keys stored in this node.
    pub keys: Vec<K>,
    /// For leaf nodes: values associated with each key.
    /// For internal nodes: empty.
    pub values: Vec<Vec<V>>,
    /// For internal nodes: child node IDs.
    /// For leaf nodes: empty.
    pub children: Vec<NodeId>,
    /// For leaf nodes: pointer to the next leaf node.
    pub next: Option<NodeId>,
    /// For leaf nodes: pointer to the previous leaf node.
    pub prev: Option<NodeId>,
    /// Whether this is a leaf node.
    pub is_leaf: bool,
    /// Parent node ID.
    pub parent: Option<NodeId>,
}

impl<K: Ord, V: PartialEq> Node<K, V> {
    /// Creates a new leaf node.
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next: None,
            prev: None,
            is_leaf: true,
            parent: None,
        }
    }

    /// Creates a new internal node.
    pub fn new_internal() -> Self {
        Self {
            is_leaf: false,
            ..Self::new_leaf()
        }
    }

    /// Returns the number of keys in this node.
    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this node is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Finds the position of the first key not less than `key`.
    #[inline]
    pub fn find_key_position(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Finds the exact position of a key, or None if not found.
    pub fn find_key(&self, key: &K) -> Option<usize> {
        let pos = self.find_key_position(key);
        if pos < self.keys.len() && &self.keys[pos] == key {
            Some(pos)
        } else {
            None
        }
    }

    /// Returns the child to descend into for `key`. Keys equal to a
    /// separator route right.
    #[inline]
    pub fn child_position(&self, key: &K) -> usize {
        let pos = self.keys.partition_point(|k| !(key < k));
        pos.min(self.children.len().saturating_sub(1))
    }

    /// Removes one value (or, with `None`, every value) stored under the key
    /// at `pos`. The key slot is dropped once it holds no values.
    /// Returns the number of values removed.
    pub fn remove_at(&mut self, pos: usize, value: Option<&V>) -> usize {
        debug_assert!(self.is_leaf);
        match value {
            Some(v) => {
                let values = &mut self.values[pos];
                let removed = match values.iter().position(|x| x == v) {
                    Some(i) => {
                        values.remove(i);
                        1
                    }
                    None => 0,
                };
                if values.is_empty() {
                    self.keys.remove(pos);
                    self.values.remove(pos);
                }
                removed
            }
            None => {
                self.keys.remove(pos);
                self.values.remove(pos).len()
            }
        }
    }
}
