//! Key ranges for index scans.

use strata_core::CompareOp;

/// A key range for index queries.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyRange<K> {
    /// All keys
    All,
    /// A single key (equality)
    Only(K),
    /// Every key except one
    Except(K),
    /// Keys >= lower bound
    LowerBound { value: K, exclusive: bool },
    /// Keys <= upper bound
    UpperBound { value: K, exclusive: bool },
    /// Keys between lower and upper bounds
    Bound {
        lower: K,
        upper: K,
        lower_exclusive: bool,
        upper_exclusive: bool,
    },
}

impl<K: Ord> KeyRange<K> {
    /// Creates a range for all keys.
    pub fn all() -> Self {
        KeyRange::All
    }

    /// Creates a range for a single key.
    pub fn only(key: K) -> Self {
        KeyRange::Only(key)
    }

    /// Creates a range with a lower bound.
    pub fn lower_bound(value: K, exclusive: bool) -> Self {
        KeyRange::LowerBound { value, exclusive }
    }

    /// Creates a range with an upper bound.
    pub fn upper_bound(value: K, exclusive: bool) -> Self {
        KeyRange::UpperBound { value, exclusive }
    }

    /// Creates a range with both bounds.
    pub fn bound(lower: K, upper: K, lower_exclusive: bool, upper_exclusive: bool) -> Self {
        KeyRange::Bound {
            lower,
            upper,
            lower_exclusive,
            upper_exclusive,
        }
    }

    /// The range of keys `k` with `k <op> key`.
    pub fn from_op(key: K, op: CompareOp) -> Self {
        match op {
            CompareOp::Lt => KeyRange::upper_bound(key, true),
            CompareOp::Le => KeyRange::upper_bound(key, false),
            CompareOp::Gt => KeyRange::lower_bound(key, true),
            CompareOp::Ge => KeyRange::lower_bound(key, false),
            CompareOp::Ne => KeyRange::Except(key),
            CompareOp::Eq => KeyRange::Only(key),
        }
    }

    /// The key a scan should start from, or None to start at the leftmost leaf.
    pub fn start(&self) -> Option<&K> {
        match self {
            KeyRange::Only(k) => Some(k),
            KeyRange::LowerBound { value, .. } => Some(value),
            KeyRange::Bound { lower, .. } => Some(lower),
            _ => None,
        }
    }

    /// Checks if a key is within this range.
    pub fn contains(&self, key: &K) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only(k) => key == k,
            KeyRange::Except(k) => key != k,
            KeyRange::LowerBound { value, exclusive } => {
                if *exclusive {
                    key > value
                } else {
                    key >= value
                }
            }
            KeyRange::UpperBound { value, exclusive } => {
                if *exclusive {
                    key < value
                } else {
                    key <= value
                }
            }
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => {
                let lower_ok = if *lower_exclusive {
                    key > lower
                } else {
                    key >= lower
                };
                lower_ok && !Self::beyond(key, upper, *upper_exclusive)
            }
        }
    }

    /// Returns true if `key` and every larger key lie outside the range.
    pub fn is_past(&self, key: &K) -> bool {
        match self {
            KeyRange::Only(k) => key > k,
            KeyRange::UpperBound { value, exclusive } => Self::beyond(key, value, *exclusive),
            KeyRange::Bound {
                upper,
                upper_exclusive,
                ..
            } => Self::beyond(key, upper, *upper_exclusive),
            _ => false,
        }
    }

    #[inline]
    fn beyond(key: &K, upper: &K, exclusive: bool) -> bool {
        if exclusive {
            key >= upper
        } else {
            key > upper
        }
    }
}
