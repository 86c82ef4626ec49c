//! B+Tree iterator implementation.

use super::node::{Node, NodeId};
use crate::range::KeyRange;

/// Forward iterator over the `(key, value)` entries of a B+Tree that fall in
/// a key range. Follows the leaf chain and stops at the first key past the
/// range's upper end.
pub struct BTreeIterator<'a, K, V> {
    /// Reference to the arena of nodes.
    arena: &'a [Node<K, V>],
    /// Range the yielded keys must fall in.
    range: KeyRange<K>,
    /// Current node ID.
    current_node: Option<NodeId>,
    /// Current position within the node.
    current_pos: usize,
    /// Current position within the values of the current key.
    value_pos: usize,
}

impl<'a, K: Ord, V> BTreeIterator<'a, K, V> {
    /// Creates an iterator starting at `pos` in leaf `start`.
    pub(crate) fn new(
        arena: &'a [Node<K, V>],
        start: Option<(NodeId, usize)>,
        range: KeyRange<K>,
    ) -> Self {
        let (current_node, current_pos) = match start {
            Some((node, pos)) => (Some(node), pos),
            None => (None, 0),
        };
        Self {
            arena,
            range,
            current_node,
            current_pos,
            value_pos: 0,
        }
    }

    /// Advances to the next key (skipping remaining values of current key).
    fn advance_key(&mut self) {
        if let Some(node_id) = self.current_node {
            self.current_pos += 1;
            if self.current_pos >= self.arena[node_id].keys.len() {
                self.current_node = self.arena[node_id].next;
                self.current_pos = 0;
            }
            self.value_pos = 0;
        }
    }
}

impl<'a, K: Ord, V> Iterator for BTreeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node_id = self.current_node?;
            let arena = self.arena;
            let node = &arena[node_id];

            if self.current_pos >= node.keys.len() {
                self.current_node = node.next;
                self.current_pos = 0;
                self.value_pos = 0;
                continue;
            }

            let key = &node.keys[self.current_pos];
            if self.range.is_past(key) {
                self.current_node = None;
                return None;
            }
            if !self.range.contains(key) {
                self.advance_key();
                continue;
            }

            let values = &node.values[self.current_pos];
            if self.value_pos < values.len() {
                let value = &values[self.value_pos];
                self.value_pos += 1;
                return Some((key, value));
            }
            self.advance_key();
        }
    }
}
