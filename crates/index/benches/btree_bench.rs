//! Benchmarks for strata-index using criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::{CompareOp, TupleLocator, Value};
use strata_index::{BTreeIndex, LocatorIndex};

fn btree_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_insert");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut tree = BTreeIndex::new(64, false);
                for i in 0..size {
                    tree.insert(i, i as u64);
                }
                black_box(tree)
            });
        });
    }

    group.finish();
}

fn btree_search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_search");

    for size in [100, 1000, 10000].iter() {
        let mut tree = BTreeIndex::new(64, false);
        for i in 0..*size {
            tree.insert(i, i as u64);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                for i in (0..100).map(|x| x * size / 100) {
                    black_box(tree.search(&i));
                }
            });
        });
    }

    group.finish();
}

fn btree_operator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_operator");

    let mut tree = BTreeIndex::new(64, true);
    for i in 0..100000i64 {
        tree.insert(i, i as u64);
    }

    for op in [CompareOp::Lt, CompareOp::Ge, CompareOp::Ne, CompareOp::Eq] {
        group.bench_with_input(BenchmarkId::from_parameter(op), &op, |b, &op| {
            b.iter(|| black_box(tree.operator(&90000, op)));
        });
    }

    group.finish();
}

fn btree_delete_benchmark(c: &mut Criterion) {
    c.bench_function("btree_delete_10000", |b| {
        b.iter_batched(
            || {
                let mut tree = BTreeIndex::new(64, false);
                for i in 0..10000 {
                    tree.insert(i, i as u64);
                }
                tree
            },
            |mut tree| {
                for i in 0..10000 {
                    tree.delete(&i);
                }
                black_box(tree)
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn locator_placement_benchmark(c: &mut Criterion) {
    let mut index = LocatorIndex::new(64, false);
    for i in 0..20000i64 {
        index.insert(Value::Int(i * 2), TupleLocator::new((i / 200) as u64, Value::Int(i * 2)));
    }

    c.bench_function("page_number_for_insert", |b| {
        b.iter(|| {
            for i in (1..20000i64).step_by(97) {
                black_box(index.page_number_for_insert(&Value::Int(i * 2 + 1)));
            }
        });
    });
}

criterion_group!(
    benches,
    btree_insert_benchmark,
    btree_search_benchmark,
    btree_operator_benchmark,
    btree_delete_benchmark,
    locator_placement_benchmark,
);
criterion_main!(benches);
