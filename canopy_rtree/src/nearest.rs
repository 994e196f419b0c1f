// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-neighbor search: depth-first branch and bound over squared
//! distances, pruned with MINMAXDIST.

use crate::tree::{Entries, NodeIdx, RTree};
use crate::types::Aabb;

impl<T, F: Fn(&T) -> Aabb> RTree<T, F> {
    /// The item whose bounds are closest to the given position, or
    /// `None` if the tree is empty. Ties are broken arbitrarily.
    pub fn nearest_neighbor(&self, x: f32, y: f32) -> Option<&T> {
        self.nearest(x, y, f32::INFINITY)
    }

    /// The item whose bounds are closest to the given position, ignoring
    /// everything at distance `max_distance` or farther. `None` if
    /// nothing is within range.
    pub fn nearest_neighbor_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&T> {
        self.nearest(x, y, max_distance * max_distance)
    }

    fn nearest(&self, x: f32, y: f32, limit_sq: f32) -> Option<&T> {
        let mut best_sq = limit_sq;
        let mut best = None;
        self.nearest_in(self.root, x, y, &mut best_sq, &mut best);
        best
    }

    fn nearest_in<'a>(
        &'a self,
        idx: NodeIdx,
        x: f32,
        y: f32,
        best_sq: &mut f32,
        best: &mut Option<&'a T>,
    ) {
        match &self.node(idx).entries {
            Entries::Items(items) => {
                for item in items {
                    let dist_sq = (self.bounds_fn)(item).square_point_distance(x, y);
                    if dist_sq < *best_sq {
                        *best_sq = dist_sq;
                        *best = Some(item);
                    }
                }
            }
            Entries::Nodes(children) => {
                // sort a private copy by distance; queries never touch
                // the live child list
                let mut by_distance: Vec<(f32, NodeIdx)> = children
                    .iter()
                    .map(|&c| (self.node(c).bounds.square_point_distance(x, y), c))
                    .collect();
                by_distance.sort_by(|a, b| {
                    a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
                });

                // no child whose distance exceeds the smallest MINMAXDIST
                // can hold the nearest item
                let mut min_max_bound = *best_sq;
                for &(_, child) in &by_distance {
                    min_max_bound = min_max_bound.min(min_max_dist(x, y, self.node(child).bounds));
                }

                for &(dist_sq, child) in &by_distance {
                    if dist_sq > min_max_bound {
                        continue;
                    }
                    if dist_sq > *best_sq {
                        break;
                    }
                    self.nearest_in(child, x, y, best_sq, best);
                }
            }
        }
    }
}

/// Upper bound on the squared distance to the closest item guaranteed to
/// lie inside `rect` (Roussopoulos, Kelley, Vincent 1995).
pub(crate) fn min_max_dist(x: f32, y: f32, rect: Aabb) -> f32 {
    let pos = [x, y];
    let lo = [rect.min_x, rect.min_y];
    let hi = [rect.max_x, rect.max_y];

    // per axis: the nearer and the farther of the two faces
    let mut near = [0.0f32; 2];
    let mut far = [0.0f32; 2];
    for k in 0..2 {
        let center = 0.5 * (lo[k] + hi[k]);
        near[k] = if pos[k] <= center { lo[k] } else { hi[k] };
        far[k] = if pos[k] >= center { lo[k] } else { hi[k] };
    }

    let total = (pos[0] - far[0]) * (pos[0] - far[0]) + (pos[1] - far[1]) * (pos[1] - far[1]);

    let mut result = f32::INFINITY;
    for k in 0..2 {
        let d = total - (pos[k] - far[k]) * (pos[k] - far[k]) + (pos[k] - near[k]) * (pos[k] - near[k]);
        result = result.min(d);
    }
    result
}
