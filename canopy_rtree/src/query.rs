// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only queries: rectangle and point searches, intersection tests,
//! iteration, and the size/height/bounds accessors.

use crate::tree::{Entries, NodeIdx, RTree};
use crate::types::Aabb;

impl<T, F: Fn(&T) -> Aabb> RTree<T, F> {
    /// All items within `area`. With `must_cover` the items have to lie
    /// fully inside the area, otherwise intersecting it is enough.
    pub fn search(&self, area: Aabb, must_cover: bool) -> Vec<&T> {
        self.search_n(area, must_cover, usize::MAX)
    }

    /// Like [`RTree::search`], but stops after `max_results` items. Which
    /// of the matching items are returned follows the tree layout and is
    /// not otherwise specified.
    pub fn search_n(&self, area: Aabb, must_cover: bool, max_results: usize) -> Vec<&T> {
        let mut found = Vec::new();
        let area = area.normalize();
        if !area.intersects(self.node(self.root).bounds) {
            return found;
        }

        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => {
                    for &child in children {
                        let child_bounds = self.node(child).bounds;
                        if !area.intersects(child_bounds) {
                            continue;
                        }
                        if area.contains_rect(child_bounds) {
                            // the whole subtree matches
                            self.add_all_items(child, max_results, &mut found);
                            if found.len() >= max_results {
                                return found;
                            }
                        } else {
                            stack.push(child);
                        }
                    }
                }
                Entries::Items(items) => {
                    for item in items {
                        let item_bounds = (self.bounds_fn)(item);
                        let hit = if must_cover {
                            area.contains_rect(item_bounds)
                        } else {
                            area.intersects(item_bounds)
                        };
                        if hit {
                            found.push(item);
                            if found.len() >= max_results {
                                return found;
                            }
                        }
                    }
                }
            }
        }
        found
    }

    /// All items within `area` that pass `filter`. Filtered items are
    /// dropped even when their whole subtree lies inside the area.
    pub fn search_filtered(
        &self,
        area: Aabb,
        must_cover: bool,
        mut filter: impl FnMut(&T) -> bool,
    ) -> Vec<&T> {
        let mut found = Vec::new();
        let area = area.normalize();
        if !area.intersects(self.node(self.root).bounds) {
            return found;
        }

        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => {
                    for &child in children {
                        let child_bounds = self.node(child).bounds;
                        if !area.intersects(child_bounds) {
                            continue;
                        }
                        if area.contains_rect(child_bounds) {
                            self.add_all_filtered_items(child, &mut filter, &mut found);
                        } else {
                            stack.push(child);
                        }
                    }
                }
                Entries::Items(items) => {
                    for item in items {
                        if !filter(item) {
                            continue;
                        }
                        let item_bounds = (self.bounds_fn)(item);
                        if (must_cover && area.contains_rect(item_bounds))
                            || (!must_cover && area.intersects(item_bounds))
                        {
                            found.push(item);
                        }
                    }
                }
            }
        }
        found
    }

    /// All items whose bounds contain the point (edges included).
    pub fn search_pos(&self, x: f32, y: f32) -> Vec<&T> {
        self.search_pos_n(x, y, usize::MAX)
    }

    /// Like [`RTree::search_pos`], but stops after `max_results` items.
    pub fn search_pos_n(&self, x: f32, y: f32, max_results: usize) -> Vec<&T> {
        let mut found = Vec::new();
        if !self.node(self.root).bounds.contains_point(x, y) {
            return found;
        }

        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => {
                    for &child in children {
                        if self.node(child).bounds.contains_point(x, y) {
                            stack.push(child);
                        }
                    }
                }
                Entries::Items(items) => {
                    for item in items {
                        if (self.bounds_fn)(item).contains_point(x, y) {
                            found.push(item);
                            if found.len() >= max_results {
                                return found;
                            }
                        }
                    }
                }
            }
        }
        found
    }

    /// Whether any item overlaps `area`. Touching rectangles where the
    /// coordinates are exactly equal are not considered to intersect.
    pub fn intersects(&self, area: Aabb) -> bool {
        let area = area.normalize();
        if !area.intersects(self.node(self.root).bounds) {
            return false;
        }

        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => {
                    for &child in children {
                        let child_bounds = self.node(child).bounds;
                        if !area.intersects(child_bounds) {
                            continue;
                        }
                        if area.contains_rect(child_bounds) {
                            return true;
                        }
                        stack.push(child);
                    }
                }
                Entries::Items(items) => {
                    for item in items {
                        if area.intersects((self.bounds_fn)(item)) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Call `f` for every stored item until it returns true. The
    /// iteration order is undefined.
    pub fn iterate_items(&self, mut f: impl FnMut(&T) -> bool) {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => stack.extend_from_slice(children),
                Entries::Items(items) => {
                    for item in items {
                        if f(item) {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Call `f` with `(bounds, height, leaf)` for every tree node until
    /// it returns true. The iteration order is undefined. Useful for
    /// graphically visualizing the tree internals.
    pub fn iterate_internal_nodes(&self, mut f: impl FnMut(Aabb, usize, bool) -> bool) {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = self.node(idx);
            if f(node.bounds, node.height, node.is_leaf()) {
                return;
            }
            if let Entries::Nodes(children) = &node.entries {
                stack.extend_from_slice(children);
            }
        }
    }

    /// All stored items.
    pub fn all(&self) -> Vec<&T> {
        let mut found = Vec::new();
        self.add_all_items(self.root, usize::MAX, &mut found);
        found
    }

    /// The total number of stored items. O(N).
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => stack.extend_from_slice(children),
                Entries::Items(items) => count += items.len(),
            }
        }
        count
    }

    /// The height of the tree; an empty tree has height 1.
    pub fn height(&self) -> usize {
        self.node(self.root).height
    }

    /// The bounding box of all items; [`Aabb::EMPTY`] when there are none.
    pub fn bounds(&self) -> Aabb {
        self.node(self.root).bounds
    }

    /// Append every item below `root` until `max_results` is reached.
    fn add_all_items<'a>(&'a self, root: NodeIdx, max_results: usize, found: &mut Vec<&'a T>) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => stack.extend_from_slice(children),
                Entries::Items(items) => {
                    for item in items {
                        if found.len() >= max_results {
                            return;
                        }
                        found.push(item);
                    }
                }
            }
        }
    }

    fn add_all_filtered_items<'a>(
        &'a self,
        root: NodeIdx,
        filter: &mut impl FnMut(&T) -> bool,
        found: &mut Vec<&'a T>,
    ) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).entries {
                Entries::Nodes(children) => stack.extend_from_slice(children),
                Entries::Items(items) => {
                    for item in items {
                        if filter(item) {
                            found.push(item);
                        }
                    }
                }
            }
        }
    }
}
