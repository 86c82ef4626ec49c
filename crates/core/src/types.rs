//! Key type definitions for Strata.
//!
//! This module defines the closed set of scalar kinds a column can hold.

use crate::error::{Error, Result};
use crate::value::Value;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Supported column types.
///
/// Every column, and therefore every index key, is one of these kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point number
    Float,
    /// UTF-8 string
    Text,
}

impl KeyType {
    /// Returns the lowercase name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            KeyType::Int => "int",
            KeyType::Float => "float",
            KeyType::Text => "text",
        }
    }

    /// Parses a textual representation into a value of this type.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        match self {
            KeyType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| Error::schema_violation(format!("cannot parse {:?} as int: {}", raw, e))),
            KeyType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|e| Error::schema_violation(format!("cannot parse {:?} as float: {}", raw, e))),
            KeyType::Text => Ok(Value::Text(raw.into())),
        }
    }

    /// Returns true if the value carries this type's tag.
    #[inline]
    pub fn matches(&self, value: &Value) -> bool {
        value.key_type() == *self
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
