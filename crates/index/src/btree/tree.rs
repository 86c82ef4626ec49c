//! B+Tree implementation.

use super::iter::BTreeIterator;
use super::node::{Node, NodeId};
use crate::range::KeyRange;
use serde::{Deserialize, Serialize};
use strata_core::CompareOp;

/// Default order (branching factor) for the B+Tree.
pub const DEFAULT_ORDER: usize = 64;

/// Smallest order that keeps splits and merges well-formed.
pub const MIN_ORDER: usize = 3;

/// A B+Tree index mapping keys to values.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. A node holds
/// at most `order - 1` keys; every node except the root holds at least
/// `ceil(order / 2) - 1`. Leaves are chained in both directions for scans.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BTreeIndex<K, V> {
    /// Arena of all nodes.
    arena: Vec<Node<K, V>>,
    /// Arena slots released by merges, reused before growing the arena.
    free: Vec<NodeId>,
    /// Root node ID.
    root: NodeId,
    /// Maximum fan-out of a node.
    order: usize,
    /// Whether one key may map to several values.
    allow_duplicates: bool,
    /// Number of stored `(key, value)` entries.
    len: usize,
}

impl<K: Clone + Ord, V: Clone + PartialEq> BTreeIndex<K, V> {
    /// Creates a new B+Tree index with the given order.
    ///
    /// Orders below [`MIN_ORDER`] are raised to it.
    pub fn new(order: usize, allow_duplicates: bool) -> Self {
        Self {
            arena: vec![Node::new_leaf()],
            free: Vec::new(),
            root: 0,
            order: order.max(MIN_ORDER),
            allow_duplicates,
            len: 0,
        }
    }

    /// Builds an index from unordered entries by sorting them first.
    pub fn bulk_load<I>(order: usize, allow_duplicates: bool, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(K, V)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut tree = Self::new(order, allow_duplicates);
        for (key, value) in entries {
            tree.insert(key, value);
        }
        tree
    }

    /// Returns the order of this tree.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns whether a key may map to several values.
    #[inline]
    pub fn allow_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels, counting the leaf level.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
            height += 1;
        }
        height
    }

    /// Minimum number of keys in a non-root node.
    #[inline]
    fn min_keys(&self) -> usize {
        (self.order - 1) / 2
    }

    /// Allocates a node, reusing a released slot when one exists.
    fn alloc_node(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.arena[id] = node;
                id
            }
            None => {
                self.arena.push(node);
                self.arena.len() - 1
            }
        }
    }

    fn release_node(&mut self, id: NodeId) {
        self.arena[id] = Node::new_leaf();
        self.free.push(id);
    }

    /// Finds the leaf node that should contain the given key.
    fn find_leaf(&self, key: &K) -> NodeId {
        let mut current = self.root;
        loop {
            let node = &self.arena[current];
            if node.is_leaf {
                return current;
            }
            current = node.children[node.child_position(key)];
        }
    }

    /// Inserts a key-value pair. Returns false, leaving the tree unchanged,
    /// when the key exists and duplicates are disallowed.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let leaf_id = self.find_leaf(&key);
        let allow_duplicates = self.allow_duplicates;
        let leaf = &mut self.arena[leaf_id];

        match leaf.find_key(&key) {
            Some(pos) => {
                if !allow_duplicates {
                    return false;
                }
                leaf.values[pos].push(value);
            }
            None => {
                let pos = leaf.find_key_position(&key);
                leaf.keys.insert(pos, key);
                leaf.values.insert(pos, vec![value]);
            }
        }
        self.len += 1;

        if self.arena[leaf_id].key_count() >= self.order {
            self.split_leaf(leaf_id);
        }
        true
    }

    /// Splits a leaf node.
    fn split_leaf(&mut self, leaf_id: NodeId) {
        let mid = self.arena[leaf_id].key_count() / 2;

        // Create new leaf with right half
        let mut new_leaf = Node::new_leaf();
        new_leaf.keys = self.arena[leaf_id].keys.split_off(mid);
        new_leaf.values = self.arena[leaf_id].values.split_off(mid);
        new_leaf.next = self.arena[leaf_id].next;
        new_leaf.prev = Some(leaf_id);
        new_leaf.parent = self.arena[leaf_id].parent;

        let new_leaf_id = self.alloc_node(new_leaf);

        if let Some(next_id) = self.arena[leaf_id].next {
            self.arena[next_id].prev = Some(new_leaf_id);
        }
        self.arena[leaf_id].next = Some(new_leaf_id);

        let promote_key = self.arena[new_leaf_id].keys[0].clone();
        self.insert_into_parent(leaf_id, promote_key, new_leaf_id);
    }

    /// Inserts a separator and the right half of a split into the parent.
    fn insert_into_parent(&mut self, left_id: NodeId, key: K, right_id: NodeId) {
        match self.arena[left_id].parent {
            None => {
                let mut new_root = Node::new_internal();
                new_root.children.push(left_id);
                new_root.children.push(right_id);
                new_root.keys.push(key);

                let new_root_id = self.alloc_node(new_root);
                self.arena[left_id].parent = Some(new_root_id);
                self.arena[right_id].parent = Some(new_root_id);
                self.root = new_root_id;
            }
            Some(parent_id) => {
                let pos = self
                    .child_index(parent_id, left_id)
                    .unwrap_or_else(|| self.arena[parent_id].child_position(&key));
                self.arena[parent_id].keys.insert(pos, key);
                self.arena[parent_id].children.insert(pos + 1, right_id);
                self.arena[right_id].parent = Some(parent_id);

                if self.arena[parent_id].key_count() >= self.order {
                    self.split_internal(parent_id);
                }
            }
        }
    }

    /// Splits an internal node.
    fn split_internal(&mut self, node_id: NodeId) {
        let mid = self.arena[node_id].key_count() / 2;

        // The middle key moves up; it stays in neither half.
        let mut new_node = Node::new_internal();
        new_node.keys = self.arena[node_id].keys.split_off(mid + 1);
        new_node.children = self.arena[node_id].children.split_off(mid + 1);
        new_node.parent = self.arena[node_id].parent;
        let promote_key = match self.arena[node_id].keys.pop() {
            Some(key) => key,
            None => return,
        };

        let new_node_id = self.alloc_node(new_node);
        for i in 0..self.arena[new_node_id].children.len() {
            let child_id = self.arena[new_node_id].children[i];
            self.arena[child_id].parent = Some(new_node_id);
        }

        self.insert_into_parent(node_id, promote_key, new_node_id);
    }

    /// Removes every value stored under `key`. Returns true if anything was removed.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key, None) > 0
    }

    /// Removes the single entry `(key, value)`. Returns true if it was present.
    pub fn delete_entry(&mut self, key: &K, value: &V) -> bool {
        self.remove(key, Some(value)) > 0
    }

    fn remove(&mut self, key: &K, value: Option<&V>) -> usize {
        let leaf_id = self.find_leaf(key);
        let pos = match self.arena[leaf_id].find_key(key) {
            Some(pos) => pos,
            None => return 0,
        };

        let removed = self.arena[leaf_id].remove_at(pos, value);
        self.len -= removed;

        if leaf_id != self.root && self.arena[leaf_id].key_count() < self.min_keys() {
            self.handle_underflow(leaf_id);
        }
        removed
    }

    /// Position of `child_id` among the children of `parent_id`.
    fn child_index(&self, parent_id: NodeId, child_id: NodeId) -> Option<usize> {
        self.arena[parent_id]
            .children
            .iter()
            .position(|&c| c == child_id)
    }

    /// Restores the minimum fill of a non-root node by borrowing from a
    /// sibling or merging with one.
    fn handle_underflow(&mut self, node_id: NodeId) {
        let parent_id = match self.arena[node_id].parent {
            Some(p) => p,
            None => return,
        };

        let min_keys = self.min_keys();
        if self.arena[node_id].key_count() >= min_keys {
            return;
        }

        let pos = match self.child_index(parent_id, node_id) {
            Some(pos) => pos,
            None => return,
        };
        let sibling_count = self.arena[parent_id].children.len();

        if pos > 0 {
            let left_sibling_id = self.arena[parent_id].children[pos - 1];
            if self.arena[left_sibling_id].key_count() > min_keys {
                self.borrow_from_left(node_id, left_sibling_id, parent_id, pos);
                return;
            }
        }

        if pos + 1 < sibling_count {
            let right_sibling_id = self.arena[parent_id].children[pos + 1];
            if self.arena[right_sibling_id].key_count() > min_keys {
                self.borrow_from_right(node_id, right_sibling_id, parent_id, pos);
                return;
            }
        }

        if pos > 0 {
            let left_sibling_id = self.arena[parent_id].children[pos - 1];
            self.merge_nodes(left_sibling_id, node_id, parent_id, pos - 1);
        } else if pos + 1 < sibling_count {
            let right_sibling_id = self.arena[parent_id].children[pos + 1];
            self.merge_nodes(node_id, right_sibling_id, parent_id, pos);
        }
    }

    /// Borrows a key from the left sibling.
    fn borrow_from_left(&mut self, node_id: NodeId, left_id: NodeId, parent_id: NodeId, pos: usize) {
        if self.arena[node_id].is_leaf {
            let (key, values) = match (self.arena[left_id].keys.pop(), self.arena[left_id].values.pop()) {
                (Some(k), Some(v)) => (k, v),
                _ => return,
            };
            self.arena[node_id].keys.insert(0, key.clone());
            self.arena[node_id].values.insert(0, values);
            self.arena[parent_id].keys[pos - 1] = key;
        } else {
            // Rotate through the parent: separator down, left's last key up.
            let (left_key, left_child) = match (self.arena[left_id].keys.pop(), self.arena[left_id].children.pop()) {
                (Some(k), Some(c)) => (k, c),
                _ => return,
            };
            let parent_key = std::mem::replace(&mut self.arena[parent_id].keys[pos - 1], left_key);
            self.arena[node_id].keys.insert(0, parent_key);
            self.arena[node_id].children.insert(0, left_child);
            self.arena[left_child].parent = Some(node_id);
        }
    }

    /// Borrows a key from the right sibling.
    fn borrow_from_right(&mut self, node_id: NodeId, right_id: NodeId, parent_id: NodeId, pos: usize) {
        if self.arena[node_id].is_leaf {
            let key = self.arena[right_id].keys.remove(0);
            let values = self.arena[right_id].values.remove(0);
            self.arena[node_id].keys.push(key);
            self.arena[node_id].values.push(values);

            let new_separator = self.arena[right_id].keys[0].clone();
            self.arena[parent_id].keys[pos] = new_separator;
        } else {
            let right_key = self.arena[right_id].keys.remove(0);
            let right_child = self.arena[right_id].children.remove(0);
            let parent_key = std::mem::replace(&mut self.arena[parent_id].keys[pos], right_key);

            self.arena[node_id].keys.push(parent_key);
            self.arena[node_id].children.push(right_child);
            self.arena[right_child].parent = Some(node_id);
        }
    }

    /// Merges `right_id` into its left sibling `left_id`; `pos` is the
    /// separator between them in the parent.
    fn merge_nodes(&mut self, left_id: NodeId, right_id: NodeId, parent_id: NodeId, pos: usize) {
        let separator = self.arena[parent_id].keys.remove(pos);
        self.arena[parent_id].children.remove(pos + 1);

        let right = std::mem::replace(&mut self.arena[right_id], Node::new_leaf());
        if right.is_leaf {
            self.arena[left_id].keys.extend(right.keys);
            self.arena[left_id].values.extend(right.values);

            self.arena[left_id].next = right.next;
            if let Some(next_id) = right.next {
                self.arena[next_id].prev = Some(left_id);
            }
        } else {
            self.arena[left_id].keys.push(separator);
            self.arena[left_id].keys.extend(right.keys);
            for &child_id in &right.children {
                self.arena[child_id].parent = Some(left_id);
            }
            self.arena[left_id].children.extend(right.children);
        }
        self.release_node(right_id);

        if parent_id == self.root {
            if self.arena[parent_id].keys.is_empty() {
                self.root = left_id;
                self.arena[left_id].parent = None;
                self.release_node(parent_id);
            }
        } else {
            self.handle_underflow(parent_id);
        }
    }

    /// Returns the leftmost leaf node.
    fn leftmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            current = self.arena[current].children[0];
        }
        current
    }

    /// Returns the rightmost leaf node.
    fn rightmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.arena[current].is_leaf {
            let children = &self.arena[current].children;
            current = children[children.len() - 1];
        }
        current
    }

    /// Returns the first value stored under `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        self.get(key).first()
    }

    /// Returns every value stored under `key`, in insertion order.
    pub fn get(&self, key: &K) -> &[V] {
        let leaf = &self.arena[self.find_leaf(key)];
        match leaf.find_key(key) {
            Some(pos) => &leaf.values[pos],
            None => &[],
        }
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        let leaf_id = self.find_leaf(key);
        self.arena[leaf_id].find_key(key).is_some()
    }

    /// Iterates over the entries whose key falls in `range`, in key order.
    pub fn scan(&self, range: KeyRange<K>) -> BTreeIterator<'_, K, V> {
        let start = match range.start() {
            Some(key) => {
                let leaf = self.find_leaf(key);
                let pos = self.arena[leaf].find_key_position(key);
                Some((leaf, pos))
            }
            None => Some((self.leftmost_leaf(), 0)),
        };
        BTreeIterator::new(&self.arena, start, range)
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> BTreeIterator<'_, K, V> {
        self.scan(KeyRange::All)
    }

    /// Returns the values of every entry with `min <= key <= max`.
    pub fn range(&self, min: &K, max: &K) -> Vec<V> {
        if min > max {
            return Vec::new();
        }
        self.scan(KeyRange::bound(min.clone(), max.clone(), false, false))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Returns the values of every entry whose key `k` satisfies `k <op> key`.
    pub fn operator(&self, key: &K, op: CompareOp) -> Vec<V> {
        if op == CompareOp::Eq {
            return self.range(key, key);
        }
        self.scan(KeyRange::from_op(key.clone(), op))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Returns the largest entry whose key is strictly less than `key`.
    /// Among duplicates, the most recently inserted value is returned.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        let mut leaf_id = self.find_leaf(key);
        let mut pos = self.arena[leaf_id].find_key_position(key);
        loop {
            let leaf = &self.arena[leaf_id];
            if pos > 0 {
                return leaf.values[pos - 1].last().map(|v| (&leaf.keys[pos - 1], v));
            }
            leaf_id = leaf.prev?;
            pos = self.arena[leaf_id].key_count();
        }
    }

    /// Returns the smallest key and its values.
    pub fn min(&self) -> Option<(&K, &[V])> {
        let leaf = &self.arena[self.leftmost_leaf()];
        match (leaf.keys.first(), leaf.values.first()) {
            (Some(k), Some(v)) => Some((k, v.as_slice())),
            _ => None,
        }
    }

    /// Returns the largest key and its values.
    pub fn max(&self) -> Option<(&K, &[V])> {
        let leaf = &self.arena[self.rightmost_leaf()];
        match (leaf.keys.last(), leaf.values.last()) {
            (Some(k), Some(v)) => Some((k, v.as_slice())),
            _ => None,
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.free.clear();
        self.arena.push(Node::new_leaf());
        self.root = 0;
        self.len = 0;
    }

    /// Walks the whole tree and reports the first structural violation:
    /// key order, node fill, parent links, leaf chain or entry count.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut leaves = Vec::new();
        self.check_node(self.root, None, None, &mut leaves)?;

        let mut expected_prev = None;
        for (i, &leaf) in leaves.iter().enumerate() {
            if self.arena[leaf].prev != expected_prev {
                return Err(format!("leaf {} has a broken prev link", leaf));
            }
            if self.arena[leaf].next != leaves.get(i + 1).copied() {
                return Err(format!("leaf {} has a broken next link", leaf));
            }
            expected_prev = Some(leaf);
        }

        let count: usize = leaves
            .iter()
            .flat_map(|&l| self.arena[l].values.iter())
            .map(Vec::len)
            .sum();
        if count != self.len {
            return Err(format!("len is {} but leaves hold {} entries", self.len, count));
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        leaves: &mut Vec<NodeId>,
    ) -> Result<(), String> {
        let node = &self.arena[id];
        if node.key_count() >= self.order {
            return Err(format!("node {} overflows with {} keys", id, node.key_count()));
        }
        if id != self.root && node.key_count() < self.min_keys() {
            return Err(format!("node {} underflows with {} keys", id, node.key_count()));
        }
        if node.keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(format!("node {} keys are not strictly ascending", id));
        }
        let in_bounds = node.keys.iter().all(|k| {
            lower.map_or(true, |l| k >= l) && upper.map_or(true, |u| k < u)
        });
        if !in_bounds {
            return Err(format!("node {} holds a key outside its separators", id));
        }

        if node.is_leaf {
            if node.values.len() != node.keys.len() || node.values.iter().any(Vec::is_empty) {
                return Err(format!("leaf {} has mismatched value slots", id));
            }
            if !self.allow_duplicates && node.values.iter().any(|v| v.len() > 1) {
                return Err(format!("leaf {} holds duplicates in a unique tree", id));
            }
            leaves.push(id);
            return Ok(());
        }

        if node.children.len() != node.keys.len() + 1 {
            return Err(format!("node {} has {} keys but {} children", id, node.key_count(), node.children.len()));
        }
        for (i, &child) in node.children.iter().enumerate() {
            if self.arena[child].parent != Some(id) {
                return Err(format!("node {} has a stale parent link", child));
            }
            let lo = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
            let hi = if i == node.keys.len() { upper } else { Some(&node.keys[i]) };
            self.check_node(child, lo, hi, leaves)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(order: usize, keys: &[i32]) -> BTreeIndex<i32, u64> {
        let mut tree = BTreeIndex::new(order, false);
        for &k in keys {
            assert!(tree.insert(k, k as u64));
        }
        tree
    }

    fn keys(tree: &BTreeIndex<i32, u64>) -> Vec<i32> {
        tree.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_btree_new() {
        let tree: BTreeIndex<i32, u64> = BTreeIndex::new(5, true);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_btree_order_is_clamped() {
        let tree: BTreeIndex<i32, u64> = BTreeIndex::new(1, false);
        assert_eq!(tree.order(), MIN_ORDER);
    }

    #[test]
    fn test_btree_insert_search() {
        let tree = tree_of(5, &[10, 20, 5]);
        assert_eq!(tree.search(&10), Some(&10));
        assert_eq!(tree.search(&20), Some(&20));
        assert_eq!(tree.search(&5), Some(&5));
        assert_eq!(tree.search(&15), None);
    }

    #[test]
    fn test_btree_unique_insert_is_noop() {
        let mut tree: BTreeIndex<i32, u64> = BTreeIndex::new(5, false);
        assert!(tree.insert(10, 100));
        assert!(!tree.insert(10, 101));
        assert_eq!(tree.get(&10), &[100]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_btree_duplicates() {
        let mut tree: BTreeIndex<i32, u64> = BTreeIndex::new(5, true);
        tree.insert(10, 100);
        tree.insert(10, 101);
        tree.insert(10, 102);
        assert_eq!(tree.get(&10), &[100, 101, 102]);
        assert_eq!(tree.search(&10), Some(&100));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_btree_delete_entry() {
        let mut tree: BTreeIndex<i32, u64> = BTreeIndex::new(5, true);
        tree.insert(10, 100);
        tree.insert(10, 101);
        tree.insert(20, 200);

        assert!(tree.delete_entry(&10, &100));
        assert_eq!(tree.get(&10), &[101]);
        assert!(!tree.delete_entry(&10, &100));
        assert!(!tree.delete_entry(&30, &300));

        assert!(tree.delete(&10));
        assert!(tree.get(&10).is_empty());
        assert!(!tree.contains_key(&10));
        assert!(!tree.delete(&10));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_btree_split() {
        let tree = tree_of(5, &(0..20).collect::<Vec<_>>());
        for i in 0..20 {
            assert_eq!(tree.search(&i), Some(&(i as u64)));
        }
        assert!(tree.height() > 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_btree_max_keys_per_node() {
        // order 4: a leaf holds at most 3 keys
        let tree = tree_of(4, &[1, 2, 3]);
        assert_eq!(tree.height(), 1);
        let tree = tree_of(4, &[1, 2, 3, 4]);
        assert_eq!(tree.height(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_btree_sequence() {
        let sequence = [13, 9, 21, 17, 5, 11, 3, 25, 27];
        let tree = tree_of(5, &sequence);
        assert_eq!(keys(&tree), vec![3, 5, 9, 11, 13, 17, 21, 25, 27]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_split_inducing_new_level() {
        let sequence = [
            13, 9, 21, 17, 5, 11, 3, 25, 27, 14, 15, 31, 29, 22, 23, 38, 45, 47, 49,
        ];
        let tree = tree_of(5, &sequence);
        assert_eq!(tree.len(), 19);
        assert!(tree.height() >= 3);
        let mut sorted = sequence.to_vec();
        sorted.sort();
        assert_eq!(keys(&tree), sorted);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_btree_delete_all() {
        let sequence = [13, 9, 21, 17, 5, 11, 3, 25, 27];
        let mut tree = tree_of(5, &sequence);
        for &num in &sequence {
            assert!(tree.delete(&num));
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.min().is_none());
    }

    #[test]
    fn test_delete_rebalances_and_collapses_root() {
        let mut tree = tree_of(4, &(0..100).collect::<Vec<_>>());
        let tall = tree.height();
        for i in (0..100).step_by(2) {
            assert!(tree.delete(&i));
            tree.check_invariants().unwrap();
        }
        for i in (1..100).step_by(2).rev() {
            assert!(tree.delete(&i));
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.height() < tall);
    }

    #[test]
    fn test_merged_nodes_are_reused() {
        let mut tree = tree_of(4, &(0..50).collect::<Vec<_>>());
        for i in 0..40 {
            tree.delete(&i);
        }
        assert!(!tree.free.is_empty());
        let arena_len = tree.arena.len();
        for i in 0..40 {
            tree.insert(i, i as u64);
            // the arena only grows once every released slot is taken
            assert!(tree.arena.len() == arena_len || tree.free.is_empty());
        }
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_btree_range() {
        let tree = tree_of(5, &(0..10).collect::<Vec<_>>());
        assert_eq!(tree.range(&3, &6), vec![3, 4, 5, 6]);
        assert_eq!(tree.range(&-5, &1), vec![0, 1]);
        assert_eq!(tree.range(&8, &20), vec![8, 9]);
        assert!(tree.range(&6, &3).is_empty());
        assert!(tree.range(&20, &30).is_empty());
    }

    #[test]
    fn test_btree_operator() {
        let tree = tree_of(4, &(0..10).collect::<Vec<_>>());
        assert_eq!(tree.operator(&5, CompareOp::Lt), vec![0, 1, 2, 3, 4]);
        assert_eq!(tree.operator(&5, CompareOp::Le), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(tree.operator(&5, CompareOp::Gt), vec![6, 7, 8, 9]);
        assert_eq!(tree.operator(&5, CompareOp::Ge), vec![5, 6, 7, 8, 9]);
        assert_eq!(tree.operator(&5, CompareOp::Ne), vec![0, 1, 2, 3, 4, 6, 7, 8, 9]);
        assert_eq!(tree.operator(&5, CompareOp::Eq), vec![5]);
        assert!(tree.operator(&42, CompareOp::Eq).is_empty());
    }

    #[test]
    fn test_operator_with_duplicates() {
        let mut tree: BTreeIndex<i32, u64> = BTreeIndex::new(3, true);
        for i in 0..30u64 {
            tree.insert((i % 5) as i32, i);
        }
        tree.check_invariants().unwrap();
        let mut eq = tree.operator(&2, CompareOp::Eq);
        eq.sort();
        assert_eq!(eq, vec![2, 7, 12, 17, 22, 27]);
        assert_eq!(tree.operator(&2, CompareOp::Ne).len(), 24);
        assert_eq!(tree.operator(&2, CompareOp::Lt).len(), 12);
    }

    #[test]
    fn test_btree_predecessor() {
        let tree = tree_of(4, &[10, 20, 30, 40, 50, 60, 70]);
        assert_eq!(tree.predecessor(&35), Some((&30, &30)));
        assert_eq!(tree.predecessor(&30), Some((&20, &20)));
        assert_eq!(tree.predecessor(&1000), Some((&70, &70)));
        assert_eq!(tree.predecessor(&10), None);
        assert_eq!(tree.predecessor(&5), None);
    }

    #[test]
    fn test_predecessor_crosses_leaves() {
        let tree = tree_of(3, &(0..40).map(|i| i * 10).collect::<Vec<_>>());
        for i in 1..40 {
            let k = i * 10;
            assert_eq!(tree.predecessor(&k).map(|(k, _)| *k), Some(k - 10));
        }
    }

    #[test]
    fn test_btree_min_max() {
        let tree = tree_of(5, &[10, 5, 20]);
        let (min_key, min_vals) = tree.min().unwrap();
        assert_eq!(*min_key, 5);
        assert_eq!(min_vals, &[5]);
        let (max_key, max_vals) = tree.max().unwrap();
        assert_eq!(*max_key, 20);
        assert_eq!(max_vals, &[20]);
    }

    #[test]
    fn test_btree_clear() {
        let mut tree = tree_of(5, &(0..50).collect::<Vec<_>>());
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.iter().next().is_none());
        tree.insert(1, 1);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_bulk_load() {
        let entries = vec![(3, 30u64), (1, 10), (2, 20), (1, 11)];
        let tree = BTreeIndex::bulk_load(4, true, entries);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(&1), &[10, 11]);
        assert_eq!(tree.range(&1, &3), vec![10, 11, 20, 30]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_string_keys() {
        let mut tree: BTreeIndex<String, u64> = BTreeIndex::new(4, true);
        for (i, name) in ["Dalia", "Ahmed", "Abdo", "John", "Zaky"].iter().enumerate() {
            tree.insert(name.to_string(), i as u64);
        }
        let names: Vec<&str> = tree.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Abdo", "Ahmed", "Dalia", "John", "Zaky"]);
        assert_eq!(tree.operator(&"B".to_string(), CompareOp::Lt), vec![2, 1]);
    }
}
