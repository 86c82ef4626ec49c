//! Integration tests for QueryEvaluator over paged tables.

use std::sync::Arc;
use strata_core::schema::TableBuilder;
use strata_core::{CompareOp, KeyType, StorageConfig, Tuple, Value};
use strata_query::{AccessPath, Combinator, QueryEvaluator, Term};
use strata_storage::{MemoryStore, TableHandle, TableStore};

/// Helper to create a Student table with `count` rows spread over small pages.
fn create_student_table(count: i64) -> TableStore {
    let schema = TableBuilder::new("Student")
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
        .unwrap();
    let config = StorageConfig::default()
        .with_page_capacity(7)
        .with_tree_order(4);
    let mut table = TableStore::create(schema, config, Arc::new(MemoryStore::new())).unwrap();
    let names = ["Abdo", "Ahmed", "Dalia", "Noor"];
    for id in 0..count {
        table
            .insert(
                Tuple::new()
                    .with("id", id)
                    .with("name", names[(id % 4) as usize])
                    .with("gpa", (id % 10) as f64 * 0.4),
            )
            .unwrap();
    }
    table
}

fn ids(tuples: &[Tuple]) -> Vec<i64> {
    tuples
        .iter()
        .filter_map(|t| t.get("id").and_then(Value::as_int))
        .collect()
}

const OPS: [CompareOp; 6] = [
    CompareOp::Lt,
    CompareOp::Le,
    CompareOp::Gt,
    CompareOp::Ge,
    CompareOp::Ne,
    CompareOp::Eq,
];

#[test]
fn test_index_path_matches_linear_path() {
    let plain = create_student_table(60);
    let mut indexed = create_student_table(60);
    indexed.create_index("gpa").unwrap();
    indexed.create_index("name").unwrap();
    indexed.create_index("id").unwrap();

    let samples = [
        ("gpa", Value::Float(1.2)),
        ("name", Value::from("Dalia")),
        ("id", Value::Int(31)),
    ];
    for (column, value) in samples {
        for op in OPS {
            let term = Term::new("Student", column, op, value.clone());
            assert_eq!(QueryEvaluator::new(&indexed).access_path(&term), AccessPath::Index);
            let expected = QueryEvaluator::new(&plain).evaluate(&[term.clone()], &[]).unwrap();
            let actual = QueryEvaluator::new(&indexed).evaluate(&[term.clone()], &[]).unwrap();
            assert_eq!(ids(&actual), ids(&expected), "{}", term);
        }
    }
}

#[test]
fn test_primary_key_scan_matches_filter() {
    let table = create_student_table(50);
    let evaluator = QueryEvaluator::new(&table);
    for op in OPS {
        for needle in [-1, 0, 13, 49, 70] {
            let term = Term::new("Student", "id", op, needle);
            assert_eq!(evaluator.access_path(&term), AccessPath::PrimaryKeyScan);
            let result = evaluator.evaluate(&[term], &[]).unwrap();
            let expected: Vec<i64> = (0..50)
                .filter(|&id| op.eval(&Value::Int(id), &Value::Int(needle)))
                .collect();
            assert_eq!(ids(&result), expected, "id {} {}", op, needle);
        }
    }
}

#[test]
fn test_mixed_combinators() {
    let mut table = create_student_table(40);
    table.create_index("name").unwrap();
    let evaluator = QueryEvaluator::new(&table);

    // name = Abdo XOR id < 8 AND gpa >= 2.0 OR id = 39
    let terms = [
        Term::eq("Student", "name", "Abdo"),
        Term::lt("Student", "id", 8),
        Term::ge("Student", "gpa", 2.0),
        Term::eq("Student", "id", 39),
    ];
    let combinators = [Combinator::Xor, Combinator::And, Combinator::Or];
    let result = evaluator.evaluate(&terms, &combinators).unwrap();

    let expected: Vec<i64> = (0..40)
        .filter(|&id| {
            let abdo = id % 4 == 0;
            let low_and_good = id < 8 && (id % 10) as f64 * 0.4 >= 2.0;
            (abdo ^ low_and_good) || id == 39
        })
        .collect();
    assert_eq!(ids(&result), expected);
}

#[test]
fn test_query_after_mutations() {
    let mut table = create_student_table(30);
    table.create_index("gpa").unwrap();
    table.delete_tuples(&Tuple::new().with("name", "Noor")).unwrap();
    table
        .update(&Value::Int(4), Tuple::new().with("gpa", 3.9))
        .unwrap();
    table
        .insert(Tuple::new().with("id", 100).with("name", "Abdo").with("gpa", 3.9))
        .unwrap();

    let result = QueryEvaluator::new(&table)
        .evaluate(&[Term::eq("Student", "gpa", 3.9)], &[])
        .unwrap();
    assert_eq!(ids(&result), vec![4, 100]);
}

#[test]
fn test_textual_query() {
    let table = create_student_table(20);
    let terms = [
        Term::parse("Student", "name", "=", "Ahmed").unwrap(),
        Term::parse("Student", "id", "<=", 9).unwrap(),
    ];
    let combinators: Vec<Combinator> = ["and"].iter().map(|c| c.parse().unwrap()).collect();
    let result = QueryEvaluator::new(&table).evaluate(&terms, &combinators).unwrap();
    assert_eq!(ids(&result), vec![1, 5, 9]);
}

#[test]
fn test_query_through_handle() {
    let handle = TableHandle::new(create_student_table(12));
    let table = handle.read();
    let result = QueryEvaluator::new(&table)
        .evaluate(&[Term::ne("Student", "name", "Abdo")], &[])
        .unwrap();
    assert_eq!(result.len(), 9);
}
