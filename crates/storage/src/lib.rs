//! Strata Storage - Paged table storage for the Strata storage engine.
//!
//! This crate provides the storage layer including:
//!
//! - `Page`: A capacity-bounded run of tuples sorted by primary key
//! - `PageDirectory`: Page ids in key order with cached key bounds
//! - `TableStore`: Tuple placement with cascading shift, updates, deletes and indices
//! - `TableHandle`: Per-table reader-writer lock
//! - `PageStore`: Persistence contract, with `MemoryStore` and `FileStore`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_core::schema::TableBuilder;
//! use strata_core::{KeyType, StorageConfig, Tuple, Value};
//! use strata_storage::{MemoryStore, TableStore};
//!
//! let schema = TableBuilder::new("Student")
//!     .unwrap()
//!     .add_column("id", KeyType::Int)
//!     .unwrap()
//!     .add_column("name", KeyType::Text)
//!     .unwrap()
//!     .primary_key("id")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let config = StorageConfig::default().with_page_capacity(2);
//! let mut table = TableStore::create(schema, config, Arc::new(MemoryStore::new())).unwrap();
//!
//! for id in [1, 3, 2] {
//!     table.insert(Tuple::new().with("id", id).with("name", "Abdo")).unwrap();
//! }
//! assert_eq!(table.page_count(), 2);
//! assert!(table.get(&Value::Int(3)).unwrap().is_some());
//! ```

mod delta;
pub mod directory;
mod fetch;
mod handle;
pub mod page;
pub mod persistence;
mod table;

pub use directory::{PageDirectory, PageEntry};
pub use fetch::fetch_pages;
pub use handle::TableHandle;
pub use page::Page;
pub use persistence::{FileStore, MemoryStore, PageStore, TableDescriptor};
pub use table::TableStore;
