//! Shared helpers for strata-storage integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use strata_core::schema::{TableBuilder, TableSchema};
use strata_core::{KeyType, StorageConfig, Tuple, TupleLocator, Value};
use strata_storage::{MemoryStore, PageStore, TableStore};

/// Installs a test subscriber once; `RUST_LOG=strata_storage=debug` shows placement decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Student(id: int, name: text, gpa: float), keyed by id.
pub fn student_schema() -> TableSchema {
    TableBuilder::new("Student")
        .unwrap()
        .add_column("id", KeyType::Int)
        .unwrap()
        .add_column("name", KeyType::Text)
        .unwrap()
        .add_column("gpa", KeyType::Float)
        .unwrap()
        .primary_key("id")
        .unwrap()
        .build()
        .unwrap()
}

pub fn student_table(capacity: usize) -> TableStore {
    student_table_in(capacity, Arc::new(MemoryStore::new()))
}

pub fn student_table_in(capacity: usize, store: Arc<dyn PageStore>) -> TableStore {
    init_tracing();
    let config = StorageConfig::default()
        .with_page_capacity(capacity)
        .with_tree_order(5);
    TableStore::create(student_schema(), config, store).unwrap()
}

pub fn student(id: i64, name: &str, gpa: f64) -> Tuple {
    Tuple::new().with("id", id).with("name", name).with("gpa", gpa)
}

/// Primary keys of each page, in directory order.
pub fn page_keys(table: &TableStore) -> Vec<Vec<i64>> {
    table
        .pages()
        .unwrap()
        .iter()
        .map(|p| {
            p.tuples()
                .iter()
                .filter_map(|t| t.get("id").and_then(Value::as_int))
                .collect()
        })
        .collect()
}

/// Checks sortedness, exact bounds, coverage, the row count and that every
/// index holds exactly one resolvable entry per tuple carrying its column.
pub fn assert_table_invariants(table: &TableStore) {
    let key_column = table.schema().primary_key();
    let pages = table.pages().unwrap();
    let entries = table.directory().entries();
    assert_eq!(pages.len(), entries.len());

    let mut total = 0;
    let mut prev_max: Option<&Value> = None;
    for (page, entry) in pages.iter().zip(entries) {
        assert_eq!(page.id(), entry.id);
        assert!(!page.is_empty(), "page {} is empty", page.id());
        assert!(page.len() <= page.capacity());

        let keys: Vec<&Value> = page
            .tuples()
            .iter()
            .map(|t| t.get(key_column).unwrap())
            .collect();
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "page {} not sorted",
            page.id()
        );
        assert_eq!(keys[0], &entry.min);
        assert_eq!(keys[keys.len() - 1], &entry.max);
        if let Some(prev) = prev_max {
            assert!(prev < &entry.min, "page {} overlaps its predecessor", page.id());
        }
        prev_max = Some(&entry.max);
        total += page.len();
    }
    assert_eq!(total, table.len());

    for column in table.indexed_columns() {
        let index = table.index(column).unwrap();
        index.check_invariants().unwrap();

        let mut expected: Vec<(Value, TupleLocator)> = pages
            .iter()
            .flat_map(|p| {
                p.tuples().iter().filter_map(move |t| {
                    let value = t.get(column)?.clone();
                    let key = t.get(key_column)?.clone();
                    Some((value, TupleLocator::new(p.id(), key)))
                })
            })
            .collect();
        let mut actual: Vec<(Value, TupleLocator)> = index
            .iter()
            .map(|(k, loc)| (k.clone(), loc.clone()))
            .collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "index on {} disagrees with pages", column);
    }
}
