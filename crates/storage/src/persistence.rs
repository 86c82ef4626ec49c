//! Persistence contract and its implementations.
//!
//! A [`PageStore`] loads and stores pages, indices and table descriptors keyed
//! by table name plus page id or column name. The table layer never sees how
//! bytes are laid out.

use crate::directory::PageDirectory;
use crate::page::Page;
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use strata_core::schema::TableSchema;
use strata_core::{Error, PageId, Result, StorageConfig};
use strata_index::LocatorIndex;

/// Everything needed to reopen a table besides its pages and indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub schema: TableSchema,
    pub config: StorageConfig,
    pub directory: PageDirectory,
    pub row_count: usize,
    pub indexed_columns: Vec<String>,
    /// Bumped on every committed mutation.
    pub version: u64,
    /// `version` at which the stored indices were last written.
    pub indices_version: u64,
}

impl TableDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Returns true if the stored indices reflect the stored pages.
    pub fn indices_current(&self) -> bool {
        self.indices_version == self.version
    }
}

/// Load/store contract between the table layer and durable storage.
pub trait PageStore: Send + Sync {
    fn store_page(&self, table: &str, page: &Page) -> Result<()>;

    /// Fails with `PageNotFound` when the page was never stored or was removed.
    fn load_page(&self, table: &str, page_id: PageId) -> Result<Page>;

    fn remove_page(&self, table: &str, page_id: PageId) -> Result<()>;

    fn store_index(&self, table: &str, column: &str, index: &LocatorIndex) -> Result<()>;

    fn load_index(&self, table: &str, column: &str) -> Result<Option<LocatorIndex>>;

    fn remove_index(&self, table: &str, column: &str) -> Result<()>;

    fn store_table_descriptor(&self, descriptor: &TableDescriptor) -> Result<()>;

    /// Fails with `TableNotFound` for unknown tables.
    fn load_table_descriptor(&self, table: &str) -> Result<TableDescriptor>;

    /// Returns true if a descriptor is stored for the table.
    fn has_table(&self, table: &str) -> Result<bool>;

    /// Removes every page, index and the descriptor of a table.
    fn remove_table(&self, table: &str) -> Result<()>;
}

#[derive(Default)]
struct MemoryTable {
    descriptor: Option<TableDescriptor>,
    pages: HashMap<PageId, Page>,
    indices: HashMap<String, LocatorIndex>,
}

/// In-process store. Values are cloned in and out, so callers never share
/// state through it.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages currently stored for a table.
    pub fn page_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |t| t.pages.len())
    }
}

impl PageStore for MemoryStore {
    fn store_page(&self, table: &str, page: &Page) -> Result<()> {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .pages
            .insert(page.id(), page.clone());
        Ok(())
    }

    fn load_page(&self, table: &str, page_id: PageId) -> Result<Page> {
        self.tables
            .read()
            .get(table)
            .and_then(|t| t.pages.get(&page_id))
            .cloned()
            .ok_or_else(|| Error::page_not_found(table, page_id))
    }

    fn remove_page(&self, table: &str, page_id: PageId) -> Result<()> {
        if let Some(t) = self.tables.write().get_mut(table) {
            t.pages.remove(&page_id);
        }
        Ok(())
    }

    fn store_index(&self, table: &str, column: &str, index: &LocatorIndex) -> Result<()> {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .indices
            .insert(column.to_string(), index.clone());
        Ok(())
    }

    fn load_index(&self, table: &str, column: &str) -> Result<Option<LocatorIndex>> {
        Ok(self
            .tables
            .read()
            .get(table)
            .and_then(|t| t.indices.get(column))
            .cloned())
    }

    fn remove_index(&self, table: &str, column: &str) -> Result<()> {
        if let Some(t) = self.tables.write().get_mut(table) {
            t.indices.remove(column);
        }
        Ok(())
    }

    fn store_table_descriptor(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.tables
            .write()
            .entry(descriptor.name().to_string())
            .or_default()
            .descriptor = Some(descriptor.clone());
        Ok(())
    }

    fn load_table_descriptor(&self, table: &str) -> Result<TableDescriptor> {
        self.tables
            .read()
            .get(table)
            .and_then(|t| t.descriptor.clone())
            .ok_or_else(|| Error::table_not_found(table))
    }

    fn has_table(&self, table: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .get(table)
            .is_some_and(|t| t.descriptor.is_some()))
    }

    fn remove_table(&self, table: &str) -> Result<()> {
        self.tables.write().remove(table);
        Ok(())
    }
}

/// Directory-backed store writing one bincode file per object:
///
/// ```text
/// <root>/<table>/table.desc
/// <root>/<table>/pages/<page_id>.page
/// <root>/<table>/indices/<column>.idx
/// ```
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    fn page_path(&self, table: &str, page_id: PageId) -> PathBuf {
        self.table_dir(table).join("pages").join(format!("{}.page", page_id))
    }

    fn index_path(&self, table: &str, column: &str) -> PathBuf {
        self.table_dir(table).join("indices").join(format!("{}.idx", column))
    }

    fn descriptor_path(&self, table: &str) -> PathBuf {
        self.table_dir(table).join("table.desc")
    }

    fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value).map_err(Error::codec)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so readers never observe a torn file.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Reads and decodes a file, or `None` if it does not exist.
    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match fs::read(path) {
            Ok(bytes) => bincode::deserialize(&bytes).map(Some).map_err(Error::codec),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PageStore for FileStore {
    fn store_page(&self, table: &str, page: &Page) -> Result<()> {
        Self::write(&self.page_path(table, page.id()), page)
    }

    fn load_page(&self, table: &str, page_id: PageId) -> Result<Page> {
        Self::read(&self.page_path(table, page_id))?
            .ok_or_else(|| Error::page_not_found(table, page_id))
    }

    fn remove_page(&self, table: &str, page_id: PageId) -> Result<()> {
        Self::remove(&self.page_path(table, page_id))
    }

    fn store_index(&self, table: &str, column: &str, index: &LocatorIndex) -> Result<()> {
        Self::write(&self.index_path(table, column), index)
    }

    fn load_index(&self, table: &str, column: &str) -> Result<Option<LocatorIndex>> {
        Self::read(&self.index_path(table, column))
    }

    fn remove_index(&self, table: &str, column: &str) -> Result<()> {
        Self::remove(&self.index_path(table, column))
    }

    fn store_table_descriptor(&self, descriptor: &TableDescriptor) -> Result<()> {
        Self::write(&self.descriptor_path(descriptor.name()), descriptor)
    }

    fn load_table_descriptor(&self, table: &str) -> Result<TableDescriptor> {
        Self::read(&self.descriptor_path(table))?.ok_or_else(|| Error::table_not_found(table))
    }

    fn has_table(&self, table: &str) -> Result<bool> {
        Ok(self.descriptor_path(table).is_file())
    }

    fn remove_table(&self, table: &str) -> Result<()> {
        match fs::remove_dir_all(self.table_dir(table)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
