//! Query terms and the combinators joining them.

use core::fmt;
use core::str::FromStr;
use strata_core::{CompareOp, Error, Result, Value};

/// A single predicate: `table.column <op> value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub table: String,
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Term {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        op: CompareOp,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Builds a term from a textual operator such as `"<="`.
    pub fn parse(
        table: impl Into<String>,
        column: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        Ok(Self::new(table, column, op.parse()?, value))
    }

    pub fn eq(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Eq, value)
    }

    pub fn ne(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Ne, value)
    }

    pub fn lt(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Lt, value)
    }

    pub fn le(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Le, value)
    }

    pub fn gt(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Gt, value)
    }

    pub fn ge(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(table, column, CompareOp::Ge, value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {} {}", self.table, self.column, self.op, self.value)
    }
}

/// How two adjacent result sets are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Intersection. Binds tighter than `Or` and `Xor`.
    And,
    /// Union.
    Or,
    /// Symmetric difference.
    Xor,
}

impl Combinator {
    pub fn name(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
            Combinator::Xor => "XOR",
        }
    }
}

impl FromStr for Combinator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("and") {
            Ok(Combinator::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Combinator::Or)
        } else if s.eq_ignore_ascii_case("xor") {
            Ok(Combinator::Xor)
        } else {
            Err(Error::InvalidCombinator(s.to_string()))
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
