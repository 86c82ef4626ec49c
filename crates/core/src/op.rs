//! Comparison operators used by index lookups and predicate terms.

use crate::error::Error;
use crate::value::Value;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// A binary comparison between a column value and a query value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
    Eq,
}

impl CompareOp {
    /// Returns the operator's symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Ne => "!=",
            CompareOp::Eq => "=",
        }
    }

    /// Returns true if `lhs.cmp(rhs) == ordering` satisfies this operator.
    #[inline]
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Eq => ordering == Ordering::Equal,
        }
    }

    /// Evaluates `lhs <op> rhs`. Values of different tags never match.
    pub fn eval(&self, lhs: &Value, rhs: &Value) -> bool {
        lhs.try_cmp(rhs).is_some_and(|ord| self.accepts(ord))
    }
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "!=" => Ok(CompareOp::Ne),
            "=" => Ok(CompareOp::Eq),
            other => Err(Error::InvalidOperator(other.into())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
