// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds a small tree and runs a couple of queries.

use canopy_rtree::{Aabb, RTree};

#[derive(Debug, Clone, PartialEq)]
struct Shelf {
    name: &'static str,
    rect: Aabb,
}

fn main() {
    let mut tree = RTree::new(|s: &Shelf| s.rect, 0);

    tree.insert(Shelf {
        name: "herbs",
        rect: Aabb::new(0.0, 0.0, 2.0, 1.0),
    });
    tree.insert(Shelf {
        name: "ferns",
        rect: Aabb::new(3.0, 0.0, 5.0, 2.0),
    });
    tree.insert(Shelf {
        name: "mosses",
        rect: Aabb::new(0.0, 3.0, 1.0, 4.0),
    });

    println!("stored {} shelves, bounds {:?}", tree.size(), tree.bounds());

    let viewport = Aabb::new(-1.0, -1.0, 4.0, 1.5);
    println!("intersecting {viewport:?}:");
    for shelf in tree.search(viewport, false) {
        println!("  {}", shelf.name);
    }

    for shelf in tree.search_pos(0.5, 3.5) {
        println!("under the cursor: {}", shelf.name);
    }

    if let Some(shelf) = tree.nearest_neighbor(6.0, 6.0) {
        println!("nearest to (6, 6): {}", shelf.name);
    }
    if tree.nearest_neighbor_within(6.0, 6.0, 1.0).is_none() {
        println!("nothing within 1.0 of (6, 6)");
    }
}
