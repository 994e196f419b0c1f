// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core operation benchmarks on a pre-populated tree.

use canopy_rtree::{Aabb, RTree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

const TREE_SIZE: usize = 10_000;

type Item = (u32, Aabb);

fn item_bounds(item: &Item) -> Aabb {
    item.1
}

fn random_rect(rng: &mut fastrand::Rng, dim: f32) -> Aabb {
    Aabb::new(
        rng.f32() * dim,
        rng.f32() * dim,
        rng.f32() * dim,
        rng.f32() * dim,
    )
    .normalize()
}

fn random_items(count: usize, seed: u64) -> Vec<Item> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|i| (i as u32, random_rect(&mut rng, 100.0)))
        .collect()
}

fn pre_populated(size: usize) -> (RTree<Item, fn(&Item) -> Aabb>, Vec<Item>) {
    let items = random_items(size, 7);
    let mut tree: RTree<Item, fn(&Item) -> Aabb> = RTree::with_seed(item_bounds, 0, 7);
    tree.bulk_load(items.clone());
    (tree, items)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_build");
    let items = random_items(TREE_SIZE, 7);
    group.throughput(Throughput::Elements(TREE_SIZE as u64));

    group.bench_function("bulk_load", |b| {
        b.iter_batched(
            || items.clone(),
            |items| {
                let mut tree: RTree<Item, fn(&Item) -> Aabb> = RTree::with_seed(item_bounds, 0, 7);
                tree.bulk_load(items);
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("insert_one_by_one", |b| {
        b.iter_batched(
            || items.clone(),
            |items| {
                let mut tree: RTree<Item, fn(&Item) -> Aabb> = RTree::with_seed(item_bounds, 0, 7);
                for item in items {
                    tree.insert(item);
                }
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let (tree, _) = pre_populated(TREE_SIZE);
    let mut rng = fastrand::Rng::with_seed(11);

    c.bench_function("rtree_insert", |b| {
        b.iter_batched(
            || (tree.clone(), (u32::MAX, random_rect(&mut rng, 100.0))),
            |(mut tree, item)| {
                tree.insert(item);
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_search(c: &mut Criterion) {
    let (tree, items) = pre_populated(TREE_SIZE);
    let mut rng = fastrand::Rng::with_seed(13);

    let mut group = c.benchmark_group("rtree_search");
    group.bench_function("search", |b| {
        b.iter(|| {
            let item = &items[rng.usize(0..items.len())];
            black_box(tree.search(item.1, false).len());
        })
    });

    group.bench_function("search_filtered", |b| {
        b.iter(|| {
            let item = &items[rng.usize(0..items.len())];
            black_box(tree.search_filtered(item.1, false, |_| true).len());
        })
    });

    group.bench_function("nearest_neighbor", |b| {
        b.iter(|| {
            let x = rng.f32() * 100.0;
            let y = rng.f32() * 100.0;
            black_box(tree.nearest_neighbor(x, y));
        })
    });
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let (tree, items) = pre_populated(TREE_SIZE);
    let mut rng = fastrand::Rng::with_seed(17);

    c.bench_function("rtree_remove", |b| {
        b.iter_batched(
            || (tree.clone(), items[rng.usize(0..items.len())]),
            |(mut tree, item)| {
                black_box(tree.remove(&item));
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build, bench_insert, bench_search, bench_remove);
criterion_main!(benches);
