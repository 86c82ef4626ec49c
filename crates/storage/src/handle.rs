//! Shared access to a table.

use crate::table::TableStore;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A cloneable handle to a table guarded by one reader-writer lock.
///
/// Mutations take the write lock for their whole plan and commit, so readers
/// always observe a table between two committed mutations.
#[derive(Clone, Debug)]
pub struct TableHandle {
    inner: Arc<RwLock<TableStore>>,
}

impl TableHandle {
    pub fn new(table: TableStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Acquires shared read access.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, TableStore> {
        self.inner.read()
    }

    /// Acquires exclusive access for a mutation.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, TableStore> {
        self.inner.write()
    }

    pub fn name(&self) -> String {
        self.read().name().to_string()
    }
}

impl From<TableStore> for TableHandle {
    fn from(table: TableStore) -> Self {
        Self::new(table)
    }
}
