//! Storage configuration.
//!
//! Page capacity and B+Tree order come from the catalog; the fetch worker count
//! bounds the read-path fan-out. Keys also accept the names used by the legacy
//! `DBApp.config` properties file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of tuples per page.
pub const DEFAULT_PAGE_CAPACITY: usize = 200;
/// Default B+Tree order (maximum fan-out).
pub const DEFAULT_TREE_ORDER: usize = 64;
/// Default number of page fetch workers.
pub const DEFAULT_FETCH_WORKERS: usize = 4;

/// Storage engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum tuples per page.
    #[serde(alias = "MaximumRowsCountinPage")]
    pub page_capacity: usize,
    /// B+Tree order; a node holds at most `tree_order - 1` keys.
    #[serde(alias = "TreeNodeOrder")]
    pub tree_order: usize,
    /// Worker threads used to fetch pages in parallel.
    pub fetch_workers: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            tree_order: DEFAULT_TREE_ORDER,
            fetch_workers: DEFAULT_FETCH_WORKERS,
        }
    }
}

impl StorageConfig {
    /// Sets the page capacity.
    pub fn with_page_capacity(mut self, page_capacity: usize) -> Self {
        self.page_capacity = page_capacity;
        self
    }

    /// Sets the B+Tree order.
    pub fn with_tree_order(mut self, tree_order: usize) -> Self {
        self.tree_order = tree_order;
        self
    }

    /// Sets the fetch worker count.
    pub fn with_fetch_workers(mut self, fetch_workers: usize) -> Self {
        self.fetch_workers = fetch_workers;
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StorageConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::invalid_config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.page_capacity < 1 {
            return Err(Error::invalid_config("page_capacity must be at least 1"));
        }
        if self.tree_order < 3 {
            return Err(Error::invalid_config(format!(
                "tree_order must be at least 3, got {}",
                self.tree_order
            )));
        }
        if self.fetch_workers < 1 {
            return Err(Error::invalid_config("fetch_workers must be at least 1"));
        }
        Ok(())
    }
}
