// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk-loads random rectangles and dumps the node structure per level,
//! a starting point for visualizing the tree.

use canopy_rtree::{Aabb, RTree};

fn main() {
    let mut rng = fastrand::Rng::with_seed(42);
    let items: Vec<Aabb> = (0..1_000)
        .map(|_| {
            let x = rng.f32() * 100.0;
            let y = rng.f32() * 100.0;
            Aabb::new(x, y, x + rng.f32() * 5.0, y + rng.f32() * 5.0)
        })
        .collect();

    let mut tree = RTree::with_seed(|r: &Aabb| *r, 0, 42);
    tree.bulk_load(items);

    println!("height {}, {} items", tree.height(), tree.size());

    let mut nodes_per_level = vec![0usize; tree.height() + 1];
    let mut area_per_level = vec![0.0f32; tree.height() + 1];
    tree.iterate_internal_nodes(|bounds, height, _leaf| {
        nodes_per_level[height] += 1;
        area_per_level[height] += bounds.area();
        false
    });

    for height in (1..=tree.height()).rev() {
        println!(
            "level {}: {} nodes, total area {:.0}",
            height, nodes_per_level[height], area_per_level[height],
        );
    }
}
