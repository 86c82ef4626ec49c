//! Paged table storage.
//!
//! A [`TableStore`] keeps a table's tuples in capacity-bounded pages sorted by
//! primary key, a [`PageDirectory`] caching each page's key bounds, and any
//! number of secondary [`LocatorIndex`] instances.
//!
//! Every mutation runs in two phases. The plan phase validates the request and
//! records page changes and index maintenance in a [`TableDelta`]; the commit
//! phase writes the delta to the [`PageStore`] and then applies it in memory.
//! A failed plan or a failed write leaves the table untouched.

use crate::delta::{IndexOp, TableDelta};
use crate::directory::{PageDirectory, PageEntry};
use crate::fetch::fetch_pages;
use crate::page::Page;
use crate::persistence::{PageStore, TableDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use strata_core::schema::TableSchema;
use strata_core::{
    CompareOp, Error, PageId, Result, StorageConfig, Tuple, TupleLocator, Value,
};
use strata_index::LocatorIndex;
use tracing::{debug, info, trace, warn};

/// A table: its pages, bounds directory and indices.
pub struct TableStore {
    schema: TableSchema,
    config: StorageConfig,
    store: Arc<dyn PageStore>,
    directory: PageDirectory,
    indices: BTreeMap<String, LocatorIndex>,
    row_count: usize,
    version: u64,
    indices_version: u64,
}

impl TableStore {
    /// Creates an empty table and stores its descriptor.
    pub fn create(
        schema: TableSchema,
        config: StorageConfig,
        store: Arc<dyn PageStore>,
    ) -> Result<Self> {
        config.validate()?;
        if store.has_table(schema.name())? {
            return Err(Error::schema_violation(format!(
                "Table already exists: {}",
                schema.name()
            )));
        }
        let table = Self {
            schema,
            config,
            store,
            directory: PageDirectory::new(),
            indices: BTreeMap::new(),
            row_count: 0,
            version: 0,
            indices_version: 0,
        };
        table
            .store
            .store_table_descriptor(&table.descriptor(&table.directory, 0, 0, 0))?;
        info!(table = %table.name(), page_capacity = table.config.page_capacity, "created table");
        Ok(table)
    }

    /// Reopens a stored table.
    ///
    /// Indices written by the last checkpoint are loaded as they are. When
    /// the table changed after that checkpoint they are rebuilt from the pages.
    pub fn open(name: &str, store: Arc<dyn PageStore>) -> Result<Self> {
        let descriptor = store.load_table_descriptor(name)?;
        descriptor.config.validate()?;
        let current = descriptor.indices_current();
        let mut table = Self {
            schema: descriptor.schema,
            config: descriptor.config,
            store,
            directory: descriptor.directory,
            indices: BTreeMap::new(),
            row_count: descriptor.row_count,
            version: descriptor.version,
            indices_version: descriptor.indices_version,
        };
        for column in descriptor.indexed_columns {
            let stored = if current {
                table.store.load_index(name, &column)?
            } else {
                None
            };
            let index = match stored {
                Some(index) => index,
                None => {
                    info!(table = %name, column = %column, "rebuilding stale index");
                    table.build_index(&column)?
                }
            };
            table.indices.insert(column, index);
        }
        debug!(
            table = %name,
            pages = table.directory.len(),
            rows = table.row_count,
            "opened table"
        );
        Ok(table)
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    #[inline]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[inline]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the page directory: page ids in key order with their bounds.
    #[inline]
    pub fn directory(&self) -> &PageDirectory {
        &self.directory
    }

    /// Returns the number of stored tuples.
    #[inline]
    pub fn len(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.directory.len()
    }

    /// Returns the index on `column`, if one was built.
    pub fn index(&self, column: &str) -> Option<&LocatorIndex> {
        self.indices.get(column)
    }

    pub fn indexed_columns(&self) -> impl Iterator<Item = &str> {
        self.indices.keys().map(String::as_str)
    }

    // ========== Reads ==========

    /// Looks up a tuple by primary key.
    pub fn get(&self, key: &Value) -> Result<Option<Tuple>> {
        self.schema.check_value(self.schema.primary_key(), key)?;
        let Some(pos) = self.directory.locate(key) else {
            return Ok(None);
        };
        let page = self.load_page_at(pos)?;
        Ok(page.get(key).cloned())
    }

    /// Returns true if a tuple with this primary key is stored.
    pub fn contains_key(&self, key: &Value) -> Result<bool> {
        if let Some(index) = self.indices.get(self.schema.primary_key()) {
            return Ok(index.contains_key(key));
        }
        Ok(self.get(key)?.is_some())
    }

    /// Loads every page in directory order.
    pub fn pages(&self) -> Result<Vec<Page>> {
        self.load_pages(&self.directory.page_ids())
    }

    /// Loads the given pages, in the order given.
    pub fn load_pages(&self, ids: &[PageId]) -> Result<Vec<Page>> {
        fetch_pages(&*self.store, self.name(), ids, self.config.fetch_workers)
    }

    /// Returns every tuple in primary key order.
    pub fn scan(&self) -> Result<Vec<Tuple>> {
        Ok(self
            .pages()?
            .into_iter()
            .flat_map(Page::into_tuples)
            .collect())
    }

    /// Resolves index locators to tuples, in directory order.
    ///
    /// Each referenced page is loaded once. A locator that does not resolve
    /// fails with `KeyNotFound`.
    pub fn fetch_tuples<'a, I>(&self, locators: I) -> Result<Vec<Tuple>>
    where
        I: IntoIterator<Item = &'a TupleLocator>,
    {
        let mut by_page: BTreeMap<PageId, Vec<&Value>> = BTreeMap::new();
        for locator in locators {
            by_page
                .entry(locator.page_id)
                .or_default()
                .push(&locator.primary_key);
        }
        let ids: Vec<PageId> = self
            .directory
            .entries()
            .iter()
            .map(|e| e.id)
            .filter(|id| by_page.contains_key(id))
            .collect();
        if ids.len() != by_page.len() {
            let missing = by_page
                .keys()
                .find(|id| !ids.contains(*id))
                .copied()
                .unwrap_or_default();
            return Err(Error::page_not_found(self.name(), missing));
        }

        let mut tuples = Vec::new();
        for page in self.load_pages(&ids)? {
            let mut keys = by_page.remove(&page.id()).unwrap_or_default();
            keys.sort();
            for key in keys {
                match page.get(key) {
                    Some(tuple) => tuples.push(tuple.clone()),
                    None => return Err(Error::key_not_found(key.clone())),
                }
            }
        }
        Ok(tuples)
    }

    /// Returns the tuples whose primary key satisfies `key op value`.
    ///
    /// Pages whose cached bounds rule out any match are never loaded.
    pub fn scan_primary_key(&self, op: CompareOp, value: &Value) -> Result<Vec<Tuple>> {
        let key_column = self.schema.primary_key();
        self.schema.check_value(key_column, value)?;
        let ids = self.directory.candidates(op, value);
        trace!(table = %self.name(), %op, pages = ids.len(), "primary key scan");
        Ok(self
            .load_pages(&ids)?
            .into_iter()
            .flat_map(Page::into_tuples)
            .filter(|t| t.get(key_column).is_some_and(|k| op.eval(k, value)))
            .collect())
    }

    /// Returns the tuples whose `column` satisfies `column op value`, reading
    /// every page. Tuples lacking the column never match.
    pub fn linear_scan(&self, column: &str, op: CompareOp, value: &Value) -> Result<Vec<Tuple>> {
        self.schema.check_value(column, value)?;
        Ok(self
            .scan()?
            .into_iter()
            .filter(|t| t.get(column).is_some_and(|v| op.eval(v, value)))
            .collect())
    }

    // ========== Mutations ==========

    /// Inserts a tuple, shifting tuples into later pages when its page is full.
    pub fn insert(&mut self, tuple: Tuple) -> Result<()> {
        if let Err(e) = self.schema.validate_tuple(&tuple) {
            return Err(self.reject("insert", e));
        }
        let key = match tuple.primary_key(self.schema.primary_key()) {
            Some(key) => key.clone(),
            None => {
                return Err(Error::MissingPrimaryKey {
                    column: self.schema.primary_key().to_string(),
                })
            }
        };
        if self.contains_key(&key)? {
            return Err(self.reject("insert", Error::duplicate_key(key)));
        }

        let mut delta = self.begin();
        self.plan_insert(&mut delta, tuple, key)?;
        self.commit(delta)
    }

    /// Overwrites the given columns of the tuple with primary key `key`.
    pub fn update(&mut self, key: &Value, values: Tuple) -> Result<()> {
        if let Err(e) = self.validate_update(key, &values) {
            return Err(self.reject("update", e));
        }
        let Some(pos) = self.directory.locate(key) else {
            return Err(self.reject("update", Error::key_not_found(key.clone())));
        };
        let id = self.page_id_at(&self.directory, pos)?;

        let mut delta = self.begin();
        let mut ops = Vec::new();
        {
            let page = delta.page_mut(id)?;
            let Some(tuple) = page.get_mut(key) else {
                return Err(self.reject("update", Error::key_not_found(key.clone())));
            };
            let locator = TupleLocator::new(id, key.clone());
            for (column, value) in &values {
                let old = tuple.set(column.clone(), value.clone());
                if !self.indices.contains_key(column) || old.as_ref() == Some(value) {
                    continue;
                }
                if let Some(old) = old {
                    ops.push(IndexOp::Remove {
                        column: column.clone(),
                        key: old,
                        locator: locator.clone(),
                    });
                }
                ops.push(IndexOp::Insert {
                    column: column.clone(),
                    key: value.clone(),
                    locator: locator.clone(),
                });
            }
        }
        delta.index_ops.extend(ops);
        debug!(table = %self.name(), page = id, key = ?key, columns = values.len(), "updating tuple");
        self.commit(delta)
    }

    /// Like [`update`](Self::update), with the primary key given as text and
    /// parsed by the key column's type.
    pub fn update_str(&mut self, key: &str, values: Tuple) -> Result<()> {
        let key = match self.schema.primary_key_type().parse(key) {
            Ok(key) => key,
            Err(e) => return Err(self.reject("update", e)),
        };
        self.update(&key, values)
    }

    /// Deletes the tuple with primary key `key` and returns it.
    pub fn delete_tuple(&mut self, key: &Value) -> Result<Tuple> {
        if let Err(e) = self.schema.check_value(self.schema.primary_key(), key) {
            return Err(self.reject("delete", e));
        }
        let mut delta = self.begin();
        let tuple = match self.plan_delete(&mut delta, key) {
            Ok(tuple) => tuple,
            Err(e @ Error::KeyNotFound { .. }) => return Err(self.reject("delete", e)),
            Err(e) => return Err(e),
        };
        self.commit(delta)?;
        Ok(tuple)
    }

    /// Deletes every tuple whose columns equal all of the predicate's values
    /// and returns how many were deleted. An empty predicate deletes all rows.
    pub fn delete_tuples(&mut self, predicate: &Tuple) -> Result<usize> {
        if predicate.is_empty() {
            return self.clear();
        }
        for (column, value) in predicate {
            if let Err(e) = self.schema.check_value(column, value) {
                return Err(self.reject("delete", e));
            }
        }

        let mut candidates: Option<BTreeSet<Value>> = None;
        for (column, value) in predicate {
            let keys = self.matching_keys(column, value)?;
            let narrowed = match candidates {
                None => keys,
                Some(prev) => prev.intersection(&keys).cloned().collect(),
            };
            let done = narrowed.is_empty();
            candidates = Some(narrowed);
            if done {
                break;
            }
        }
        let keys = candidates.unwrap_or_default();
        if keys.is_empty() {
            return Ok(0);
        }

        let mut delta = self.begin();
        for key in &keys {
            self.plan_delete(&mut delta, key)?;
        }
        self.commit(delta)?;
        info!(table = %self.name(), deleted = keys.len(), "deleted tuples");
        Ok(keys.len())
    }

    /// Builds an index on `column` from the stored pages and checkpoints.
    ///
    /// The primary key's index is unique; every other index allows duplicates.
    pub fn create_index(&mut self, column: &str) -> Result<()> {
        if self.indices.contains_key(column) {
            let e = Error::IndexAlreadyExists {
                column: column.to_string(),
            };
            return Err(self.reject("create_index", e));
        }
        if let Err(e) = self.schema.column(column) {
            return Err(self.reject("create_index", e));
        }
        let index = self.build_index(column)?;
        info!(
            table = %self.name(),
            column,
            entries = index.len(),
            height = index.height(),
            "built index"
        );
        self.indices.insert(column.to_string(), index);
        self.checkpoint()
    }

    /// Persists every index and the descriptor.
    pub fn checkpoint(&mut self) -> Result<()> {
        for (column, index) in &self.indices {
            self.store.store_index(self.name(), column, index)?;
        }
        let descriptor = self.descriptor(&self.directory, self.row_count, self.version, self.version);
        self.store.store_table_descriptor(&descriptor)?;
        self.indices_version = self.version;
        debug!(table = %self.name(), version = self.version, "checkpoint");
        Ok(())
    }

    /// Removes the table's pages, indices and descriptor from the store.
    pub fn drop_table(self) -> Result<()> {
        self.store.remove_table(self.name())?;
        info!(table = %self.name(), "dropped table");
        Ok(())
    }

    // ========== Planning ==========

    fn begin(&self) -> TableDelta {
        TableDelta::new(Arc::clone(&self.store), self.name(), self.directory.clone())
    }

    fn plan_insert(&self, delta: &mut TableDelta, tuple: Tuple, key: Value) -> Result<()> {
        let Some(start) = self.candidate_position(&delta.directory, &key) else {
            self.place_on_new_page(delta, 0, tuple)?;
            delta.row_delta += 1;
            return Ok(());
        };
        debug!(table = %self.name(), key = ?key, position = start, "candidate page");

        let mut carry = tuple;
        let mut carry_key = key;
        let mut pos = start;
        loop {
            if pos == delta.directory.len() {
                self.place_on_new_page(delta, pos, carry)?;
                break;
            }
            let id = self.page_id_at(&delta.directory, pos)?;
            let adds = self.locator_ops(&carry, id, true);
            let page = delta.page_mut(id)?;

            if !page.is_full() {
                page.insert(carry)?;
                let bounds = bounds_of(page);
                refresh_bounds(delta, pos, bounds);
                delta.index_ops.extend(adds);
                break;
            }
            if page.key_bounds().map_or(true, |(_, max)| &carry_key > max) {
                pos += 1;
                continue;
            }

            let Some(evicted) = page.remove_last() else {
                return Err(Error::PageFull { page: id });
            };
            page.insert(carry)?;
            let bounds = bounds_of(page);
            refresh_bounds(delta, pos, bounds);
            let evicted_key = evicted
                .primary_key(self.schema.primary_key())
                .cloned()
                .ok_or_else(|| Error::MissingPrimaryKey {
                    column: self.schema.primary_key().to_string(),
                })?;
            debug!(table = %self.name(), page = id, evicted = ?evicted_key, "cascading shift");
            delta.index_ops.extend(adds);
            delta.index_ops.extend(self.locator_ops(&evicted, id, false));
            carry = evicted;
            carry_key = evicted_key;
            pos += 1;
        }
        delta.row_delta += 1;
        Ok(())
    }

    fn place_on_new_page(&self, delta: &mut TableDelta, pos: usize, tuple: Tuple) -> Result<()> {
        let id = delta.directory.allocate_id();
        let mut page = Page::new(id, self.config.page_capacity, self.schema.primary_key());
        delta.index_ops.extend(self.locator_ops(&tuple, id, true));
        page.insert(tuple)?;
        if let Some((min, max)) = bounds_of(&page) {
            delta.directory.insert(pos, PageEntry::new(id, min, max));
        }
        debug!(table = %self.name(), page = id, position = pos, "created page");
        delta.add_page(page);
        Ok(())
    }

    fn plan_delete(&self, delta: &mut TableDelta, key: &Value) -> Result<Tuple> {
        let pos = delta
            .directory
            .locate(key)
            .ok_or_else(|| Error::key_not_found(key.clone()))?;
        let id = self.page_id_at(&delta.directory, pos)?;
        let page = delta.page_mut(id)?;
        let tuple = page.delete(key)?;
        match bounds_of(page) {
            Some(bounds) => refresh_bounds(delta, pos, Some(bounds)),
            None => {
                delta.directory.remove(pos);
                delta.drop_page(id)?;
                debug!(table = %self.name(), page = id, "removed empty page");
            }
        }
        delta.index_ops.extend(self.locator_ops(&tuple, id, false));
        delta.row_delta -= 1;
        Ok(tuple)
    }

    fn clear(&mut self) -> Result<usize> {
        let count = self.row_count;
        let mut delta = self.begin();
        for id in delta.directory.page_ids() {
            delta.drop_page(id)?;
        }
        delta.directory.clear();
        delta.clear_indices = true;
        delta.row_delta = -(count as isize);
        self.commit(delta)?;
        info!(table = %self.name(), deleted = count, "cleared table");
        Ok(count)
    }

    /// Position of the page a new key should be placed on, or `None` for an
    /// empty table. Taken from the primary key index when there is one, else
    /// by binary search over the page bounds.
    fn candidate_position(&self, directory: &PageDirectory, key: &Value) -> Option<usize> {
        self.indices
            .get(self.schema.primary_key())
            .and_then(|index| index.insert_neighbor(key))
            .and_then(|locator| directory.position_of(locator))
            .or_else(|| directory.locate(key))
    }

    /// Primary keys of the tuples whose `column` equals `value`.
    fn matching_keys(&self, column: &str, value: &Value) -> Result<BTreeSet<Value>> {
        let key_column = self.schema.primary_key();
        if column == key_column {
            return Ok(self
                .get(value)?
                .map(|_| value.clone())
                .into_iter()
                .collect());
        }
        if let Some(index) = self.indices.get(column) {
            return Ok(index
                .get(value)
                .iter()
                .map(|loc| loc.primary_key.clone())
                .collect());
        }
        Ok(self
            .scan()?
            .into_iter()
            .filter(|t| t.get(column) == Some(value))
            .filter_map(|t| t.primary_key(key_column).cloned())
            .collect())
    }

    /// Index maintenance for `tuple` on page `id`, one op per index whose
    /// column the tuple carries.
    fn locator_ops(&self, tuple: &Tuple, id: PageId, insert: bool) -> Vec<IndexOp> {
        let Some(key) = tuple.primary_key(self.schema.primary_key()) else {
            return Vec::new();
        };
        self.indices
            .keys()
            .filter_map(|column| {
                let value = tuple.get(column)?.clone();
                let column = column.clone();
                let locator = TupleLocator::new(id, key.clone());
                Some(if insert {
                    IndexOp::Insert {
                        column,
                        key: value,
                        locator,
                    }
                } else {
                    IndexOp::Remove {
                        column,
                        key: value,
                        locator,
                    }
                })
            })
            .collect()
    }

    fn validate_update(&self, key: &Value, values: &Tuple) -> Result<()> {
        let key_column = self.schema.primary_key();
        if values.contains(key_column) {
            return Err(Error::PrimaryKeyImmutable {
                column: key_column.to_string(),
            });
        }
        let max = self.schema.columns().len().saturating_sub(1);
        if values.len() > max {
            return Err(Error::TooManyColumns {
                given: values.len(),
                max,
            });
        }
        self.schema.check_value(key_column, key)?;
        for (column, value) in values {
            self.schema.check_value(column, value)?;
        }
        Ok(())
    }

    fn build_index(&self, column: &str) -> Result<LocatorIndex> {
        let key_column = self.schema.primary_key();
        let mut entries = Vec::with_capacity(self.row_count);
        for page in self.pages()? {
            for tuple in page.tuples() {
                if let (Some(value), Some(key)) = (tuple.get(column), tuple.get(key_column)) {
                    entries.push((value.clone(), TupleLocator::new(page.id(), key.clone())));
                }
            }
        }
        Ok(LocatorIndex::bulk_load(
            self.config.tree_order,
            column != key_column,
            entries,
        ))
    }

    // ========== Commit ==========

    /// Writes the delta to the store, then applies it in memory.
    ///
    /// The descriptor is written last. If any write fails, the touched pages
    /// are restored from the delta's stored images before the error is
    /// returned, and the in-memory state is left as it was.
    fn commit(&mut self, delta: TableDelta) -> Result<()> {
        if delta.is_empty() {
            return Ok(());
        }
        let row_count = self.row_count.saturating_add_signed(delta.row_delta);
        let version = self.version + 1;
        let descriptor = self.descriptor(&delta.directory, row_count, version, self.indices_version);
        if let Err(e) = self.write_delta(&delta, &descriptor) {
            let unrestored = delta.restore();
            warn!(
                table = %self.name(),
                error = %e,
                pages = delta.pages.len() + delta.removed.len(),
                unrestored,
                "commit failed, rolled back page writes"
            );
            return Err(e);
        }

        self.directory = delta.directory;
        if delta.clear_indices {
            for index in self.indices.values_mut() {
                index.clear();
            }
        }
        for op in delta.index_ops {
            self.apply_index_op(op);
        }
        self.row_count = row_count;
        self.version = version;
        Ok(())
    }

    fn write_delta(&self, delta: &TableDelta, descriptor: &TableDescriptor) -> Result<()> {
        for page in delta.pages.values() {
            self.store.store_page(self.name(), page)?;
        }
        for &id in &delta.removed {
            self.store.remove_page(self.name(), id)?;
        }
        self.store.store_table_descriptor(descriptor)
    }

    fn apply_index_op(&mut self, op: IndexOp) {
        match op {
            IndexOp::Insert {
                column,
                key,
                locator,
            } => {
                if let Some(index) = self.indices.get_mut(&column) {
                    trace!(column = %column, key = ?key, %locator, "index insert");
                    let inserted = index.insert(key.clone(), locator.clone());
                    if !inserted {
                        warn!(table = %self.schema.name(), column = %column, key = ?key, %locator, "index out of sync: entry already present");
                    }
                    debug_assert!(inserted, "index on {} already holds {}", column, key);
                }
            }
            IndexOp::Remove {
                column,
                key,
                locator,
            } => {
                if let Some(index) = self.indices.get_mut(&column) {
                    trace!(column = %column, key = ?key, %locator, "index remove");
                    let removed = index.delete_entry(&key, &locator);
                    if !removed {
                        warn!(table = %self.schema.name(), column = %column, key = ?key, %locator, "index out of sync: entry missing");
                    }
                    debug_assert!(removed, "index on {} has no entry {} -> {}", column, key, locator);
                }
            }
        }
    }

    // ========== Helpers ==========

    fn descriptor(
        &self,
        directory: &PageDirectory,
        row_count: usize,
        version: u64,
        indices_version: u64,
    ) -> TableDescriptor {
        TableDescriptor {
            schema: self.schema.clone(),
            config: self.config.clone(),
            directory: directory.clone(),
            row_count,
            indexed_columns: self.indices.keys().cloned().collect(),
            version,
            indices_version,
        }
    }

    fn page_id_at(&self, directory: &PageDirectory, pos: usize) -> Result<PageId> {
        directory
            .get(pos)
            .map(|e| e.id)
            .ok_or_else(|| Error::page_not_found(self.name(), pos as u64))
    }

    fn load_page_at(&self, pos: usize) -> Result<Page> {
        let id = self.page_id_at(&self.directory, pos)?;
        self.store.load_page(self.name(), id)
    }

    fn reject(&self, op: &'static str, err: Error) -> Error {
        warn!(table = %self.name(), op, error = %err, "rejected mutation");
        err
    }
}

fn bounds_of(page: &Page) -> Option<(Value, Value)> {
    page.key_bounds()
        .map(|(min, max)| (min.clone(), max.clone()))
}

fn refresh_bounds(delta: &mut TableDelta, pos: usize, bounds: Option<(Value, Value)>) {
    if let Some((min, max)) = bounds {
        delta.directory.set_bounds(pos, min, max);
    }
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("name", &self.name())
            .field("pages", &self.directory.len())
            .field("rows", &self.row_count)
            .field("indices", &self.indices.keys().collect::<Vec<_>>())
            .field("version", &self.version)
            .finish()
    }
}
