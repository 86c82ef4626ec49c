//! Query evaluation against a single table.
//!
//! Each term is answered by the cheapest access path available: an index on
//! its column, a bounds-pruned scan when it constrains the primary key, or a
//! full linear scan. The per-term result sets are then folded left to right,
//! all `AND`s first, then `OR`/`XOR` in order of appearance.

use crate::result_set::ResultSet;
use crate::term::{Combinator, Term};
use strata_core::{Error, Result, Tuple};
use strata_storage::TableStore;
use tracing::{debug, trace, warn};

/// How a term's result set is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessPath {
    /// `BTreeIndex::operator` on the term's column, then locator resolution.
    Index,
    /// Scan of the pages whose key bounds may satisfy the term.
    PrimaryKeyScan,
    /// Scan of every page.
    LinearScan,
}

/// Evaluates predicate terms against one table.
pub struct QueryEvaluator<'a> {
    table: &'a TableStore,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(table: &'a TableStore) -> Self {
        Self { table }
    }

    /// Evaluates `terms` joined by `combinators` and returns the matching
    /// tuples ordered by primary key.
    ///
    /// `combinators` must hold exactly one entry fewer than `terms`. No terms
    /// selects every tuple.
    pub fn evaluate(&self, terms: &[Term], combinators: &[Combinator]) -> Result<Vec<Tuple>> {
        if let Err(e) = self.validate(terms, combinators) {
            warn!(table = %self.table.name(), error = %e, "rejected query");
            return Err(e);
        }
        if terms.is_empty() {
            return self.table.scan();
        }

        let mut sets = terms
            .iter()
            .map(|term| self.evaluate_term(term))
            .collect::<Result<Vec<_>>>()?;
        let mut combinators = combinators.to_vec();
        while let Some(pos) = next_combinator(&combinators) {
            let combinator = combinators.remove(pos);
            let right = sets.remove(pos + 1);
            let left = std::mem::take(&mut sets[pos]);
            sets[pos] = combine(combinator, left, right);
            trace!(%combinator, position = pos, rows = sets[pos].len(), "combined");
        }
        Ok(sets.pop().map(ResultSet::into_tuples).unwrap_or_default())
    }

    /// Returns the access path used for `term`.
    pub fn access_path(&self, term: &Term) -> AccessPath {
        if self.table.index(&term.column).is_some() {
            AccessPath::Index
        } else if term.column == self.table.schema().primary_key() {
            AccessPath::PrimaryKeyScan
        } else {
            AccessPath::LinearScan
        }
    }

    fn evaluate_term(&self, term: &Term) -> Result<ResultSet> {
        let path = self.access_path(term);
        let tuples = match path {
            AccessPath::Index => match self.table.index(&term.column) {
                Some(index) => {
                    let locators = index.operator(&term.value, term.op);
                    self.table.fetch_tuples(&locators)?
                }
                None => self.table.linear_scan(&term.column, term.op, &term.value)?,
            },
            AccessPath::PrimaryKeyScan => self.table.scan_primary_key(term.op, &term.value)?,
            AccessPath::LinearScan => {
                self.table
                    .linear_scan(&term.column, term.op, &term.value)?
            }
        };
        debug!(%term, ?path, rows = tuples.len(), "evaluated term");
        Ok(ResultSet::from_tuples(
            self.table.schema().primary_key(),
            tuples,
        ))
    }

    fn validate(&self, terms: &[Term], combinators: &[Combinator]) -> Result<()> {
        if combinators.len() != terms.len().saturating_sub(1) {
            return Err(Error::invalid_query(format!(
                "{} terms need {} combinators, got {}",
                terms.len(),
                terms.len().saturating_sub(1),
                combinators.len()
            )));
        }
        let Some(first) = terms.first() else {
            return Ok(());
        };
        if let Some(other) = terms.iter().find(|t| t.table != first.table) {
            return Err(Error::invalid_query(format!(
                "terms reference more than one table: {} and {}",
                first.table, other.table
            )));
        }
        if first.table != self.table.name() {
            return Err(Error::table_not_found(&first.table));
        }
        let schema = self.table.schema();
        for term in terms {
            schema.check_value(&term.column, &term.value)?;
        }
        Ok(())
    }
}

/// Position of the next combinator to apply: the first `AND`, else the first
/// remaining `OR`/`XOR`.
fn next_combinator(combinators: &[Combinator]) -> Option<usize> {
    combinators
        .iter()
        .position(|c| *c == Combinator::And)
        .or(if combinators.is_empty() { None } else { Some(0) })
}

fn combine(combinator: Combinator, left: ResultSet, right: ResultSet) -> ResultSet {
    match combinator {
        Combinator::And => left.intersect(right),
        Combinator::Or => left.union(right),
        Combinator::Xor => left.xor(right),
    }
}
