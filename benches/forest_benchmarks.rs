//! Benchmarks for forest construction and query answering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use wordvec::core::indexing::{build_forest, BuildParams};
use wordvec::core::store::{InMemoryVectorStore, IndexedStore};
use wordvec::{AnnForest, QueryEngine, QueryOptions, SearchBudget};

const DIMENSION: usize = 64;
const ITEMS: usize = 5_000;

fn random_store(items: usize) -> InMemoryVectorStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = InMemoryVectorStore::new(DIMENSION).unwrap();
    for i in 0..items {
        let v: Vec<f32> = (0..DIMENSION).map(|_| rng.gen_range(-1.0..1.0)).collect();
        store.insert(&format!("w{i}"), &v).unwrap();
    }
    store
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_build");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);
    let store = random_store(ITEMS);
    group.throughput(Throughput::Elements(ITEMS as u64));

    for trees in [1usize, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(trees), &trees, |b, &trees| {
            b.iter(|| {
                let params = BuildParams { num_trees: trees, leaf_capacity: None, seed: 7 };
                black_box(build_forest(&store, params).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_search");
    let store = random_store(ITEMS);
    let forest: AnnForest = build_forest(&store, BuildParams { num_trees: 10, leaf_capacity: None, seed: 7 }).unwrap();
    let query = vec![0.5f32; DIMENSION];

    for budget in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("candidates", budget), &budget, |b, &budget| {
            b.iter(|| black_box(forest.search_candidates(&query, 10, SearchBudget::Limited(budget)).unwrap()));
        });
    }

    let forest = Arc::new(forest);
    let indexed = IndexedStore::new(store.into_vocabulary(), Arc::clone(&forest)).unwrap();
    let engine = QueryEngine::new(forest, Arc::new(indexed), QueryOptions::default()).unwrap();
    let keywords = vec!["w1".to_string(), "w2".to_string()];
    group.bench_function("similar_keywords", |b| {
        b.iter(|| black_box(engine.similar_keywords(&keywords, Some(10)).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
