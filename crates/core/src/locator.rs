//! Tuple locators stored as index values.

use crate::value::Value;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable page identifier. Never reused within a table.
pub type PageId = u64;

/// Where an indexed tuple lives: the page holding it and its primary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TupleLocator {
    pub page_id: PageId,
    pub primary_key: Value,
}

impl TupleLocator {
    #[inline]
    pub fn new(page_id: PageId, primary_key: Value) -> Self {
        Self {
            page_id,
            primary_key,
        }
    }
}

impl fmt::Display for TupleLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.page_id, self.primary_key)
    }
}
