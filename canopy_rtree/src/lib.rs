// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy R-tree: a dynamic, in-memory 2D spatial index.
//!
//! Canopy R-tree stores caller-supplied items under the rectangles a
//! caller-supplied bounds function derives for them, and answers
//! rectangle, point, and nearest-neighbor queries over them.
//!
//! - Insert items one by one or bulk-load many at once.
//! - Query by rectangle (intersecting or fully covered), by point, with
//!   an optional filter, or with a result cap.
//! - Nearest-neighbor search, unbounded or within a radius.
//! - Remove by equality or with an explicit predicate.
//!
//! Splits use the R\*-tree heuristics (split axis by minimal total
//! margin, split index by minimal overlap). Bulk loads build with OMT
//! (overlap minimizing top-down) and merge into a non-empty tree by
//! inserting the smaller tree into the larger one at the matching level.
//! Nearest-neighbor search prunes with MINMAXDIST and never mutates the
//! tree, so any number of read-only queries may run concurrently as long
//! as no writer is active.
//!
//! # Example
//!
//! ```rust
//! use canopy_rtree::{Aabb, RTree};
//!
//! // items can be anything; here the item is its own rectangle
//! let mut tree = RTree::new(|r: &Aabb| *r, 0);
//! tree.insert(Aabb::new(0.0, 0.0, 1.0, 1.0));
//! tree.insert(Aabb::new(2.0, 2.0, 3.0, 3.0));
//! assert_eq!(tree.size(), 2);
//!
//! // both items lie fully inside the area
//! let hits = tree.search(Aabb::new(0.0, 0.0, 4.0, 4.0), true);
//! assert_eq!(hits.len(), 2);
//!
//! // the nearest item to a point outside of everything
//! let nearest = tree.nearest_neighbor(10.0, 10.0).unwrap();
//! assert_eq!(*nearest, Aabb::new(2.0, 2.0, 3.0, 3.0));
//! ```
//!
//! # Bulk loading
//!
//! [`RTree::bulk_load`] is several times faster than inserting items one
//! by one and produces a tree that also queries faster. Loading into a
//! non-empty tree merges a separately built tree into the existing one,
//! which works well for clustered batches but can degrade query
//! performance when the new items are scattered across the old ones.
//!
//! # Float semantics
//!
//! Coordinates are `f32` and assumed finite (no NaNs). Rectangles that
//! merely touch, with exactly equal coordinates, do not count as
//! intersecting; containment includes the edges. The bounds reported by
//! the bounds function must stay stable for as long as the item is in
//! the tree.

mod nearest;
mod query;
mod select;
mod tree;
mod types;

pub use tree::RTree;
pub use types::Aabb;
