//! Value type definitions for Strata.
//!
//! This module defines the `Value` enum which represents any value that can be stored
//! in a tuple field or used as an index key.

use crate::types::KeyType;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// A value that can be stored in a tuple field.
///
/// Values of the same tag are totally ordered: integers and floats numerically
/// (floats by IEEE 754 total order, except that `-0.0` equals `0.0`), text
/// lexicographically by bytes.
/// Ordering two values with different tags is a programmer error and panics;
/// every write path validates tags against the schema before comparing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Text(String),
}

impl Value {
    /// Returns the key type of this value.
    #[inline]
    pub fn key_type(&self) -> KeyType {
        match self {
            Value::Int(_) => KeyType::Int,
            Value::Float(_) => KeyType::Float,
            Value::Text(_) => KeyType::Text,
        }
    }

    /// Returns the i64 value if this is an Int, None otherwise.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float, None otherwise.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is Text, None otherwise.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Compares two values of the same tag, or returns None when the tags differ.
    pub fn try_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Some(unsigned_zero(*a).total_cmp(&unsigned_zero(*b))),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Maps `-0.0` to `0.0` and leaves every other float alone.
#[inline]
fn unsigned_zero(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.try_cmp(other) == Some(Ordering::Equal)
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.try_cmp(other) {
            Some(ordering) => ordering,
            None => panic!(
                "cannot compare {} value with {} value",
                self.key_type(),
                other.key_type()
            ),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Int(i) => i.hash(state),
            Value::Float(f) => unsigned_zero(*f).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(unsigned_zero(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_key_type() {
        assert_eq!(Value::Int(1).key_type(), KeyType::Int);
        assert_eq!(Value::Float(1.0).key_type(), KeyType::Float);
        assert_eq!(Value::from("a").key_type(), KeyType::Text);
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Float(-0.5) < Value::Float(0.25));
        assert!(Value::from("Abdo") < Value::from("Ahmed"));
        assert_eq!(Value::from("x").cmp(&Value::from("x")), Ordering::Equal);
    }

    #[test]
    fn test_float_nan_is_ordered() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, Value::Float(f64::NAN));
        assert!(Value::Float(f64::INFINITY) < nan);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let neg = Value::Float(-0.0);
        let pos = Value::Float(0.0);
        assert_eq!(neg, pos);
        assert_eq!(neg.cmp(&pos), Ordering::Equal);
        assert_eq!(hash(&neg), hash(&pos));
        assert!(Value::Float(-1e-300) < neg);
        assert!(neg < Value::Float(1e-300));
        assert_eq!(Value::from(-0.0).as_float().map(f64::is_sign_positive), Some(true));
    }

    #[test]
    fn test_try_cmp_across_tags() {
        assert_eq!(Value::Int(1).try_cmp(&Value::Float(1.0)), None);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    #[should_panic(expected = "cannot compare int value with text value")]
    fn test_cmp_across_tags_panics() {
        let _ = Value::Int(1).cmp(&Value::from("1"));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Int(3).as_float(), None);
        assert_eq!(Value::Float(0.95).as_float(), Some(0.95));
        assert_eq!(Value::from("Dalia").as_text(), Some("Dalia"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(2343432).to_string(), "2343432");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from("John Noor").to_string(), "John Noor");
    }
}
