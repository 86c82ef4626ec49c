//! Per-term query results keyed by primary key.

use std::collections::btree_map::{self, BTreeMap};
use strata_core::{Tuple, Value};

/// Tuples keyed by primary key, combined with set algebra.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    rows: BTreeMap<Value, Tuple>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects tuples by their `key_column` value. Tuples without one are skipped.
    pub fn from_tuples(key_column: &str, tuples: impl IntoIterator<Item = Tuple>) -> Self {
        let rows = tuples
            .into_iter()
            .filter_map(|t| Some((t.primary_key(key_column)?.clone(), t)))
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.rows.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.rows.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Value, Tuple> {
        self.rows.iter()
    }

    /// Tuples in primary key order.
    pub fn into_tuples(self) -> Vec<Tuple> {
        self.rows.into_values().collect()
    }

    /// Keeps the rows present in both sets.
    pub fn intersect(mut self, other: ResultSet) -> ResultSet {
        self.rows.retain(|key, _| other.rows.contains_key(key));
        self
    }

    /// Keeps the rows present in either set.
    pub fn union(mut self, other: ResultSet) -> ResultSet {
        for (key, tuple) in other.rows {
            self.rows.entry(key).or_insert(tuple);
        }
        self
    }

    /// Keeps the rows present in exactly one set.
    pub fn xor(mut self, other: ResultSet) -> ResultSet {
        for (key, tuple) in other.rows {
            match self.rows.entry(key) {
                btree_map::Entry::Occupied(e) => {
                    e.remove();
                }
                btree_map::Entry::Vacant(e) => {
                    e.insert(tuple);
                }
            }
        }
        self
    }
}

impl FromIterator<(Value, Tuple)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (Value, Tuple)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> ResultSet {
        ResultSet::from_tuples(
            "id",
            ids.iter().map(|&id| Tuple::new().with("id", id).with("name", "Abdo")),
        )
    }

    fn ids(set: &ResultSet) -> Vec<i64> {
        set.keys().filter_map(Value::as_int).collect()
    }

    #[test]
    fn test_intersect() {
        assert_eq!(ids(&set(&[1, 2, 3]).intersect(set(&[2, 3, 4]))), vec![2, 3]);
        assert!(set(&[1]).intersect(set(&[])).is_empty());
    }

    #[test]
    fn test_union() {
        assert_eq!(ids(&set(&[3, 1]).union(set(&[2, 3]))), vec![1, 2, 3]);
    }

    #[test]
    fn test_xor() {
        assert_eq!(ids(&set(&[1, 2, 3]).xor(set(&[2, 3, 4]))), vec![1, 4]);
        assert!(set(&[5]).xor(set(&[5])).is_empty());
    }

    #[test]
    fn test_skips_tuples_without_key() {
        let set = ResultSet::from_tuples("id", vec![Tuple::new().with("name", "Noor")]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_into_tuples_ordered() {
        let tuples = set(&[9, 4, 7]).into_tuples();
        let ids: Vec<_> = tuples.iter().filter_map(|t| t.get("id")?.as_int()).collect();
        assert_eq!(ids, vec![4, 7, 9]);
    }
}
