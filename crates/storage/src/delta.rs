//! Pending changes of a single table mutation.
//!
//! Mutations are planned against a [`TableDelta`]: pages are loaded into the
//! delta's working set and modified there, the directory is a private copy,
//! and index maintenance is recorded as a list of operations. Nothing touches
//! the table until the delta is committed.
//!
//! The delta also keeps the stored image of every page it touches, so a
//! commit that fails halfway can put the store back the way it was.

use crate::directory::PageDirectory;
use crate::page::Page;
use crate::persistence::PageStore;
use std::collections::btree_map::{BTreeMap, Entry};
use std::sync::Arc;
use strata_core::{PageId, Result, TupleLocator, Value};
use tracing::error;

/// One index maintenance step.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum IndexOp {
    Insert {
        column: String,
        key: Value,
        locator: TupleLocator,
    },
    Remove {
        column: String,
        key: Value,
        locator: TupleLocator,
    },
}

pub(crate) struct TableDelta {
    store: Arc<dyn PageStore>,
    table: String,
    /// Directory as it will be after the commit.
    pub directory: PageDirectory,
    /// Pages loaded or created by the plan; all of them are written back.
    pub pages: BTreeMap<PageId, Page>,
    /// Pages to delete from the store.
    pub removed: Vec<PageId>,
    /// Index maintenance, applied in order.
    pub index_ops: Vec<IndexOp>,
    pub row_delta: isize,
    /// Empty every index before applying `index_ops`.
    pub clear_indices: bool,
    /// Stored image of each touched page; `None` for pages the plan created.
    originals: BTreeMap<PageId, Option<Page>>,
}

impl TableDelta {
    pub fn new(store: Arc<dyn PageStore>, table: &str, directory: PageDirectory) -> Self {
        Self {
            store,
            table: table.to_string(),
            directory,
            pages: BTreeMap::new(),
            removed: Vec::new(),
            index_ops: Vec::new(),
            row_delta: 0,
            clear_indices: false,
            originals: BTreeMap::new(),
        }
    }

    /// Returns the working copy of a page, loading it on first access.
    pub fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        match self.pages.entry(id) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let page = self.store.load_page(&self.table, id)?;
                self.originals.entry(id).or_insert_with(|| Some(page.clone()));
                Ok(e.insert(page))
            }
        }
    }

    /// Adds a freshly created page to the working set.
    pub fn add_page(&mut self, page: Page) {
        self.originals.entry(page.id()).or_insert(None);
        self.pages.insert(page.id(), page);
    }

    /// Drops a page from the working set and schedules its removal.
    ///
    /// A page that was never loaded is read once so it can be restored.
    pub fn drop_page(&mut self, id: PageId) -> Result<()> {
        if !self.originals.contains_key(&id) {
            let page = self.store.load_page(&self.table, id)?;
            self.originals.insert(id, Some(page));
        }
        self.pages.remove(&id);
        self.removed.push(id);
        Ok(())
    }

    /// Puts every touched page back into its pre-commit state: stored images
    /// are written again and pages the plan created are removed.
    ///
    /// Keeps going past failures and returns how many pages could not be
    /// restored.
    pub fn restore(&self) -> usize {
        let mut failed = 0;
        for (&id, original) in &self.originals {
            let restored = match original {
                Some(page) => self.store.store_page(&self.table, page),
                None => self.store.remove_page(&self.table, id),
            };
            if let Err(e) = restored {
                error!(table = %self.table, page = id, error = %e, "failed to restore page");
                failed += 1;
            }
        }
        failed
    }

    /// Returns true if the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.removed.is_empty() && self.index_ops.is_empty() && !self.clear_indices
    }
}
