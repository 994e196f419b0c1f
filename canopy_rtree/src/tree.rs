// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure and mutation: node arena, choose-subtree descent,
//! R*-style splitting, OMT bulk build, STLT merge, and removal.

use crate::select::group_items;
use crate::types::{Aabb, enlarged_area, merged_area};

/// Index of a node in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

/// What a node holds: child nodes (internal) or items (leaf), never both.
#[derive(Clone, Debug)]
pub(crate) enum Entries<T> {
    Nodes(Vec<NodeIdx>),
    Items(Vec<T>),
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) bounds: Aabb,
    pub(crate) height: usize,
    pub(crate) entries: Entries<T>,
}

impl<T> Node<T> {
    fn new_leaf() -> Self {
        Self {
            bounds: Aabb::EMPTY,
            height: 1,
            entries: Entries::Items(Vec::new()),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.entries, Entries::Items(_))
    }

    pub(crate) fn len(&self) -> usize {
        match &self.entries {
            Entries::Nodes(children) => children.len(),
            Entries::Items(items) => items.len(),
        }
    }
}

/// A dynamic 2D R-tree for storing and querying rectangles and points.
///
/// The tree holds opaque items and derives each item's rectangle through
/// the `bounds_fn` supplied at construction. The bounds of an item must
/// stay stable while it is stored; mutating them voids every structural
/// guarantee.
#[derive(Clone)]
pub struct RTree<T, F: Fn(&T) -> Aabb> {
    pub(crate) max_entries: usize,
    pub(crate) min_entries: usize,
    pub(crate) bounds_fn: F,
    pub(crate) nodes: Vec<Node<T>>,
    free: Vec<NodeIdx>,
    pub(crate) root: NodeIdx,
    rng: fastrand::Rng,
}

impl<T, F: Fn(&T) -> Aabb> RTree<T, F> {
    /// Create an empty tree. `max_entries` bounds the entry count of a
    /// single node; `0` picks the default of 16, and anything below 4 is
    /// raised to 4. The minimum fill is 40% of the maximum.
    pub fn new(bounds_fn: F, max_entries: usize) -> Self {
        Self::with_rng(bounds_fn, max_entries, fastrand::Rng::new())
    }

    /// Like [`RTree::new`], but with a deterministic seed for the pivot
    /// selection inside bulk loads. Tree contents and query results do
    /// not depend on the seed, only the exact node layout does.
    pub fn with_seed(bounds_fn: F, max_entries: usize, seed: u64) -> Self {
        Self::with_rng(bounds_fn, max_entries, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(bounds_fn: F, max_entries: usize, rng: fastrand::Rng) -> Self {
        let max_entries = if max_entries == 0 { 16 } else { max_entries };
        let max_entries = max_entries.max(4);
        let min_entries = 2usize.max((max_entries as f32 * 0.4).ceil() as usize);

        let mut tree = Self {
            max_entries,
            min_entries,
            bounds_fn,
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeIdx::new(0),
            rng,
        };
        tree.clear();
        tree
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Node::new_leaf());
        self.root = NodeIdx::new(0);
    }

    pub(crate) fn node(&self, idx: NodeIdx) -> &Node<T> {
        &self.nodes[idx.get()]
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        &mut self.nodes[idx.get()]
    }

    fn alloc_node(&mut self, node: Node<T>) -> NodeIdx {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx.get()] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                NodeIdx::new(self.nodes.len() - 1)
            }
        }
    }

    fn release_node(&mut self, idx: NodeIdx) {
        self.nodes[idx.get()] = Node::new_leaf();
        self.free.push(idx);
    }

    /// Bounds of the `i`-th entry of a node: the child's cached bounds
    /// for internal nodes, the item's rectangle for leaves.
    fn entry_bounds(&self, idx: NodeIdx, i: usize) -> Aabb {
        match &self.node(idx).entries {
            Entries::Nodes(children) => self.node(children[i]).bounds,
            Entries::Items(items) => (self.bounds_fn)(&items[i]),
        }
    }

    /// Union of the bounds of the entries in `[start, end)`.
    fn sub_bbox(&self, idx: NodeIdx, start: usize, end: usize) -> Aabb {
        let mut bbox = Aabb::EMPTY;
        for i in start..end {
            bbox = bbox.merge(self.entry_bounds(idx, i));
        }
        bbox
    }

    fn recalc_bounds(&mut self, idx: NodeIdx) {
        let bounds = self.sub_bbox(idx, 0, self.node(idx).len());
        self.node_mut(idx).bounds = bounds;
    }

    /// Insert a single item.
    pub fn insert(&mut self, item: T) {
        let bbox = (self.bounds_fn)(&item);
        let level = self.node(self.root).height - 1;

        // best leaf for the new item, and the path down to it
        let (target, path) = self.choose_subtree(bbox, level);
        let leaf = self.node_mut(target);
        match &mut leaf.entries {
            Entries::Items(items) => items.push(item),
            Entries::Nodes(_) => unreachable!("descent to the leaf level ends at a leaf"),
        }
        leaf.bounds = leaf.bounds.merge(bbox);

        self.split_nodes(&path, level);
        self.adjust_parent_bboxes(&path, bbox, level);
    }

    /// Graft a whole subtree at the given level (bulk-load merging).
    fn insert_subtree(&mut self, subtree: NodeIdx, level: usize) {
        let bbox = self.node(subtree).bounds;

        let (target, path) = self.choose_subtree(bbox, level);
        let node = self.node_mut(target);
        match &mut node.entries {
            Entries::Nodes(children) => children.push(subtree),
            Entries::Items(_) => unreachable!("subtrees are grafted above the leaf level"),
        }
        node.bounds = node.bounds.merge(bbox);

        self.split_nodes(&path, level);
        self.adjust_parent_bboxes(&path, bbox, level);
    }

    /// Descend to the node best suited for a new entry at `level`,
    /// collecting the nodes visited on the way; the chosen node is the
    /// last element of the returned path.
    fn choose_subtree(&self, bbox: Aabb, level: usize) -> (NodeIdx, Vec<NodeIdx>) {
        let mut path = Vec::new();
        let mut sub = self.root;
        loop {
            path.push(sub);
            let node = self.node(sub);
            if node.is_leaf() || path.len() - 1 == level {
                break;
            }
            let Entries::Nodes(children) = &node.entries else {
                unreachable!("non-leaf nodes hold child nodes");
            };

            let mut min_area = f32::INFINITY;
            let mut min_enlargement = f32::INFINITY;
            let mut next = children[0];
            for &child in children {
                let child_bounds = self.node(child).bounds;
                let area = child_bounds.area();
                let enlargement = enlarged_area(bbox, child_bounds) - area;

                // least enlargement wins; the smallest area breaks ties
                if enlargement < min_enlargement {
                    min_enlargement = enlargement;
                    min_area = min_area.min(area);
                    next = child;
                } else if enlargement == min_enlargement && area < min_area {
                    min_area = area;
                    next = child;
                }
            }
            sub = next;
        }
        (sub, path)
    }

    /// Split every overflowing node along the insertion path, bottom-up.
    fn split_nodes(&mut self, path: &[NodeIdx], level: usize) {
        let mut level = level;
        loop {
            if self.node(path[level]).len() <= self.max_entries {
                break;
            }
            self.split(path, level);
            if level == 0 {
                break;
            }
            level -= 1;
        }
    }

    /// Split the overflowed node at `level` into two.
    fn split(&mut self, path: &[NodeIdx], level: usize) {
        let node_idx = path[level];
        let min = self.min_entries;
        let count = self.node(node_idx).len();

        self.choose_split_axis(node_idx, min, count);
        let split_index = self.choose_split_index(node_idx, min, count);

        let height = self.node(node_idx).height;
        let entries = match &mut self.node_mut(node_idx).entries {
            Entries::Nodes(children) => Entries::Nodes(children.split_off(split_index)),
            Entries::Items(items) => Entries::Items(items.split_off(split_index)),
        };
        let sibling = self.alloc_node(Node {
            bounds: Aabb::EMPTY,
            height,
            entries,
        });

        self.recalc_bounds(node_idx);
        self.recalc_bounds(sibling);

        if level > 0 {
            let parent = path[level - 1];
            match &mut self.node_mut(parent).entries {
                Entries::Nodes(children) => children.push(sibling),
                Entries::Items(_) => unreachable!("parents on the insertion path are internal"),
            }
        } else {
            self.split_root(node_idx, sibling);
        }
    }

    /// Replace the root with a new one holding `a` and `b` as its only
    /// children.
    fn split_root(&mut self, a: NodeIdx, b: NodeIdx) {
        let height = self.node(self.root).height + 1;
        let root = self.alloc_node(Node {
            bounds: Aabb::EMPTY,
            height,
            entries: Entries::Nodes(vec![a, b]),
        });
        self.root = root;
        self.recalc_bounds(root);
    }

    /// Sort the node's entries by the axis whose split distributions have
    /// the smaller total margin.
    fn choose_split_axis(&mut self, node_idx: NodeIdx, min: usize, count: usize) {
        self.sort_entries(node_idx, 0);
        let x_margin = self.all_dist_margin(node_idx, min, count);
        self.sort_entries(node_idx, 1);
        let y_margin = self.all_dist_margin(node_idx, min, count);

        // the entries are sorted by min-y at this point, so only a
        // strictly better x margin re-sorts
        if x_margin < y_margin {
            self.sort_entries(node_idx, 0);
        }
    }

    fn sort_entries(&mut self, node_idx: NodeIdx, axis: usize) {
        let taken = std::mem::replace(
            &mut self.nodes[node_idx.get()].entries,
            Entries::Nodes(Vec::new()),
        );
        let sorted = match taken {
            Entries::Items(mut items) => {
                let bounds_fn = &self.bounds_fn;
                items.sort_by(|a, b| {
                    bounds_fn(a)
                        .min_on(axis)
                        .partial_cmp(&bounds_fn(b).min_on(axis))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                Entries::Items(items)
            }
            Entries::Nodes(mut children) => {
                children.sort_by(|&a, &b| {
                    self.nodes[a.get()]
                        .bounds
                        .min_on(axis)
                        .partial_cmp(&self.nodes[b.get()].bounds.min_on(axis))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                Entries::Nodes(children)
            }
        };
        self.nodes[node_idx.get()].entries = sorted;
    }

    /// Total margin over every split distribution that leaves both sides
    /// at least `min` full. Smaller sums mark the better split axis.
    fn all_dist_margin(&self, node_idx: NodeIdx, min: usize, count: usize) -> f32 {
        let mut left_bbox = self.sub_bbox(node_idx, 0, min);
        let mut right_bbox = self.sub_bbox(node_idx, count - min, count);
        let mut margin = left_bbox.margin() + right_bbox.margin();

        for i in min..count - min {
            left_bbox = left_bbox.merge(self.entry_bounds(node_idx, i));
            margin += left_bbox.margin();
        }
        for i in (min..count - min).rev() {
            right_bbox = right_bbox.merge(self.entry_bounds(node_idx, i));
            margin += right_bbox.margin();
        }
        margin
    }

    /// Index at which the node's sorted entries should be split: minimal
    /// overlap between the two sides, ties broken by the smaller summed
    /// area. Defaults to `count - min`.
    fn choose_split_index(&self, node_idx: NodeIdx, min: usize, count: usize) -> usize {
        let mut min_overlap = f32::INFINITY;
        let mut min_area = f32::INFINITY;

        let mut index = count - min;
        for i in min..=count - min {
            let bbox1 = self.sub_bbox(node_idx, 0, i);
            let bbox2 = self.sub_bbox(node_idx, i, count);

            let overlap = merged_area(bbox1, bbox2);
            let area = bbox1.area() + bbox2.area();

            if overlap < min_overlap {
                min_overlap = overlap;
                min_area = min_area.min(area);
                index = i;
            } else if overlap == min_overlap && area < min_area {
                min_area = area;
                index = i;
            }
        }
        index
    }

    /// Extend the bounds of every node along the insertion path by the
    /// new entry's bounds.
    fn adjust_parent_bboxes(&mut self, path: &[NodeIdx], bbox: Aabb, level: usize) {
        for i in (0..=level).rev() {
            let node = self.node_mut(path[i]);
            node.bounds = node.bounds.merge(bbox);
        }
    }

    /// Insert many items at once.
    ///
    /// Bulk insertion is several times faster than inserting one by one
    /// and the resulting tree also queries faster. Loading into a
    /// non-empty tree builds a separate tree first and merges the smaller
    /// one into the larger, which works well when the loaded items are
    /// clustered but degrades query performance when they are scattered
    /// across the existing items.
    pub fn bulk_load(&mut self, items: Vec<T>) {
        if items.len() < self.min_entries {
            for item in items {
                self.insert(item);
            }
            return;
        }

        let new_tree = self.build(items, 0);

        if self.node(self.root).len() == 0 {
            let old = self.root;
            self.root = new_tree;
            self.release_node(old);
        } else if self.node(self.root).height == self.node(new_tree).height {
            self.split_root(self.root, new_tree);
        } else {
            let mut small = new_tree;
            if self.node(self.root).height < self.node(small).height {
                // the freshly built tree is deeper: adopt it, graft the old root
                small = std::mem::replace(&mut self.root, new_tree);
            }
            let level = self.node(self.root).height - self.node(small).height - 1;
            self.insert_subtree(small, level);
        }
    }

    /// Build a subtree over `items` with the OMT (overlap minimizing
    /// top-down) scheme. `height` is 0 on the outermost call, meaning
    /// "derive it from the item count".
    fn build(&mut self, items: Vec<T>, height: usize) -> NodeIdx {
        let count = items.len();

        if count <= self.max_entries {
            let leaf = self.alloc_node(Node {
                bounds: Aabb::EMPTY,
                height: 1,
                entries: Entries::Items(items),
            });
            self.recalc_bounds(leaf);
            return leaf;
        }

        let count_f = count as f64;
        let mut max = self.max_entries as f64;
        let mut height = height;
        if height == 0 {
            // target height of the resulting tree = log_max(count)
            height = (count_f.ln() / max.ln()).ceil() as usize;
            // lower the root fanout so the capacity spreads evenly
            let capacity = max.powi(height as i32 - 1);
            max = (count_f / capacity).ceil();
        }

        let node = self.alloc_node(Node {
            bounds: Aabb::EMPTY,
            height,
            entries: Entries::Nodes(Vec::new()),
        });

        // Split the items into `max` mostly-square tiles: group by x into
        // column slabs, then group each slab by y.
        let grp_y = (count_f / max).ceil() as usize;
        let grp_x = grp_y * max.sqrt().ceil() as usize;

        let mut items = items;
        group_items(&mut items, grp_x, 0, &self.bounds_fn, &mut self.rng);

        let mut rest = items;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(grp_x));
            let mut tile = rest;
            rest = tail;

            group_items(&mut tile, grp_y, 1, &self.bounds_fn, &mut self.rng);

            let mut tile_rest = tile;
            while !tile_rest.is_empty() {
                let tail = tile_rest.split_off(tile_rest.len().min(grp_y));
                let strip = tile_rest;
                tile_rest = tail;

                // the strip is now nearly square; build it recursively
                let child = self.build(strip, height - 1);
                match &mut self.node_mut(node).entries {
                    Entries::Nodes(children) => children.push(child),
                    Entries::Items(_) => unreachable!("bulk-built internal nodes hold child nodes"),
                }
            }
        }

        self.recalc_bounds(node);
        node
    }

    /// Remove the first item equal to `item`. Returns whether an item was
    /// removed.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_by(item, T::eq)
    }

    /// Remove the first item matching `item` under `equals`. Useful when
    /// only a copy of the originally inserted item is at hand. Returns
    /// whether an item was removed.
    pub fn remove_by(&mut self, item: &T, equals: impl Fn(&T, &T) -> bool) -> bool {
        let bbox = (self.bounds_fn)(item);

        let mut path: Vec<NodeIdx> = Vec::new();
        let mut child_indexes: Vec<usize> = Vec::new();
        let mut parent: Option<NodeIdx> = None;
        let mut child_idx = 0usize;
        let mut going_up = false;

        // depth-first iterative traversal, descending only into subtrees
        // whose bounds contain the item's bounds
        let mut current = Some(self.root);
        while current.is_some() || !path.is_empty() {
            let nod = match current.take() {
                Some(n) => n,
                None => {
                    // go up and continue behind the previously visited child
                    let n = path.pop().expect("the loop guard keeps the path non-empty");
                    parent = Some(path.last().copied().unwrap_or(self.root));
                    child_idx = child_indexes.pop().expect("stacks grow and shrink together");
                    going_up = true;
                    n
                }
            };

            if let Entries::Items(items) = &self.node(nod).entries {
                if let Some(found) = items.iter().position(|it| equals(item, it)) {
                    if let Entries::Items(items) = &mut self.node_mut(nod).entries {
                        items.swap_remove(found);
                    }
                    path.push(nod);
                    self.condense(&path);
                    return true;
                }
            }

            let node = self.node(nod);
            let contained = node.bounds.contains_rect(bbox);
            if !going_up && !node.is_leaf() && contained {
                // remember the position on this level, continue at the first child
                path.push(nod);
                child_indexes.push(child_idx);
                child_idx = 0;
                parent = Some(nod);
                let Entries::Nodes(children) = &self.node(nod).entries else {
                    unreachable!("non-leaf nodes hold child nodes");
                };
                current = Some(children[0]);
            } else if let Some(p) = parent {
                // go right
                child_idx += 1;
                if let Entries::Nodes(children) = &self.node(p).entries {
                    current = children.get(child_idx).copied();
                }
                going_up = false;
            } else {
                current = None;
            }
        }
        false
    }

    /// Drop now-empty nodes along `path` (bottom-up) and refresh the
    /// bounds of the surviving ones. Underflowed nodes are kept; only
    /// fully empty ones are removed.
    fn condense(&mut self, path: &[NodeIdx]) {
        for i in (0..path.len()).rev() {
            let idx = path[i];
            if self.node(idx).len() == 0 {
                if i > 0 {
                    let parent = path[i - 1];
                    if let Entries::Nodes(children) = &mut self.node_mut(parent).entries {
                        if let Some(pos) = children.iter().position(|&c| c == idx) {
                            children.swap_remove(pos);
                        }
                    }
                    self.release_node(idx);
                } else {
                    // the tree is empty
                    self.clear();
                }
            } else {
                self.recalc_bounds(idx);
            }
        }
    }
}

impl<T, F: Fn(&T) -> Aabb> std::fmt::Debug for RTree<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTree")
            .field("max_entries", &self.max_entries)
            .field("min_entries", &self.min_entries)
            .field("height", &self.node(self.root).height)
            .field("arena_nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Walk the whole tree and assert the structural invariants: entry
/// counts, heights, and cached bounds. Cached bounds are conservative:
/// the post-split path adjustment extends a node by the new item's
/// bounds even when the split moved the item into the sibling, so the
/// cache must cover the entry union but need not equal it.
#[cfg(test)]
pub(crate) fn check_structure<T, F: Fn(&T) -> Aabb>(tree: &RTree<T, F>) {
    fn walk<T, F: Fn(&T) -> Aabb>(tree: &RTree<T, F>, idx: NodeIdx, is_root: bool) {
        let node = tree.node(idx);
        assert!(
            node.len() <= tree.max_entries,
            "node overflows: {} > {}",
            node.len(),
            tree.max_entries
        );
        if !is_root {
            assert!(node.len() >= 1, "non-root node is empty");
        }

        let mut union = Aabb::EMPTY;
        match &node.entries {
            Entries::Items(items) => {
                assert_eq!(node.height, 1, "leaf height must be 1");
                for item in items {
                    union = union.merge((tree.bounds_fn)(item));
                }
            }
            Entries::Nodes(children) => {
                for &child in children {
                    assert_eq!(
                        tree.node(child).height,
                        node.height - 1,
                        "child height mismatch"
                    );
                    union = union.merge(tree.node(child).bounds);
                    walk(tree, child, false);
                }
            }
        }
        if node.len() == 0 {
            assert_eq!(node.bounds, Aabb::EMPTY, "empty node with bounds");
        } else {
            assert!(
                node.bounds.contains_rect(union),
                "cached bounds do not cover the entries"
            );
        }
    }

    walk(tree, tree.root, true);
}

#[cfg(test)]
mod tests {
    use super::*;

    type Item = (u32, Aabb);

    fn item_bounds(item: &Item) -> Aabb {
        item.1
    }

    fn new_tree(max_entries: usize) -> RTree<Item, fn(&Item) -> Aabb> {
        RTree::with_seed(item_bounds, max_entries, 42)
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

    fn sorted_ids(items: &[&Item]) -> Vec<u32> {
        let mut ids: Vec<u32> = items.iter().map(|it| it.0).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn parameters_are_clamped() {
        let tree = new_tree(0);
        assert_eq!(tree.max_entries, 16);
        assert_eq!(tree.min_entries, 7);

        let tree = new_tree(2);
        assert_eq!(tree.max_entries, 4);
        assert_eq!(tree.min_entries, 2);

        let tree = new_tree(9);
        assert_eq!(tree.max_entries, 9);
        assert_eq!(tree.min_entries, 4);
    }

    #[test]
    fn insert_and_search_two_items() {
        let mut tree = new_tree(0);
        tree.insert((1, Aabb::new(0.0, 0.0, 1.0, 1.0)));
        tree.insert((2, Aabb::new(2.0, 2.0, 3.0, 3.0)));

        assert_eq!(tree.size(), 2);
        assert_eq!(tree.height(), 1);

        let hits = tree.search(Aabb::new(0.0, 0.0, 4.0, 4.0), true);
        assert_eq!(sorted_ids(&hits), vec![1, 2]);

        let hits = tree.search(Aabb::new(0.0, 0.0, 2.0, 2.0), true);
        assert_eq!(sorted_ids(&hits), vec![1]);
    }

    #[test]
    fn insert_many_keeps_invariants() {
        let mut tree = new_tree(0);
        for item in random_items(500, 9) {
            tree.insert(item);
        }
        check_structure(&tree);
        assert_eq!(tree.size(), 500);
        assert!(tree.height() > 1);

        // insert-built trees never underflow below the minimum fill
        let mut stack = vec![tree.root];
        while let Some(idx) = stack.pop() {
            let node = tree.node(idx);
            if idx != tree.root {
                assert!(node.len() >= tree.min_entries);
            }
            if let Entries::Nodes(children) = &node.entries {
                stack.extend_from_slice(children);
            }
        }
    }

    #[test]
    fn bulk_load_keeps_invariants() {
        let items = random_items(1000, 11);
        let mut tree = new_tree(0);
        tree.bulk_load(items.clone());

        check_structure(&tree);
        assert_eq!(tree.size(), 1000);
        assert_eq!(sorted_ids(&tree.all()), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn bulk_load_empty_leaves_tree_unchanged() {
        let mut tree = new_tree(0);
        tree.bulk_load(random_items(100, 13));
        let size = tree.size();
        let height = tree.height();
        let bounds = tree.bounds();

        tree.bulk_load(Vec::new());
        assert_eq!(tree.size(), size);
        assert_eq!(tree.height(), height);
        assert_eq!(tree.bounds(), bounds);
    }

    #[test]
    fn bulk_load_few_items_inserts_them() {
        let mut tree = new_tree(0);
        tree.bulk_load(random_items(3, 17));
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.height(), 1);
        check_structure(&tree);
    }

    #[test]
    fn bulk_load_merges_smaller_tree_into_larger() {
        let mut tree = new_tree(0);
        tree.bulk_load(random_items(1000, 19));
        let tall = tree.height();

        let extra: Vec<Item> = random_items(50, 23)
            .into_iter()
            .map(|(id, r)| (id + 1000, r))
            .collect();
        tree.bulk_load(extra);

        assert_eq!(tree.size(), 1050);
        assert!(tree.height() >= tall);
        check_structure(&tree);
        assert_eq!(sorted_ids(&tree.all()), (0..1050).collect::<Vec<_>>());
    }

    #[test]
    fn bulk_load_adopts_deeper_tree() {
        let mut tree = new_tree(0);
        tree.bulk_load(random_items(50, 29));
        let shallow = tree.height();

        let extra: Vec<Item> = random_items(1000, 31)
            .into_iter()
            .map(|(id, r)| (id + 50, r))
            .collect();
        tree.bulk_load(extra);

        assert!(tree.height() > shallow);
        assert_eq!(tree.size(), 1050);
        check_structure(&tree);
    }

    #[test]
    fn bulk_load_equal_heights_splits_root() {
        let mut tree = new_tree(0);
        tree.bulk_load(random_items(1000, 37));
        let height = tree.height();

        let extra: Vec<Item> = random_items(1000, 41)
            .into_iter()
            .map(|(id, r)| (id + 1000, r))
            .collect();
        tree.bulk_load(extra);

        assert_eq!(tree.height(), height + 1);
        assert_eq!(tree.size(), 2000);
        check_structure(&tree);
    }

    #[test]
    fn remove_single_item() {
        let mut tree = new_tree(0);
        let items = random_items(5, 43);
        for item in items.clone() {
            tree.insert(item);
        }

        assert!(tree.remove(&items[2]));
        assert_eq!(tree.size(), 4);

        let all = tree.all();
        assert_eq!(sorted_ids(&all), vec![0, 1, 3, 4]);
        check_structure(&tree);
    }

    #[test]
    fn remove_missing_item_does_nothing() {
        let mut tree = new_tree(0);
        for item in random_items(20, 47) {
            tree.insert(item);
        }
        assert!(!tree.remove(&(99, Aabb::new(0.5, 0.5, 0.6, 0.6))));
        assert_eq!(tree.size(), 20);
        check_structure(&tree);
    }

    #[test]
    fn remove_by_matches_with_predicate() {
        let mut tree = new_tree(0);
        for item in random_items(20, 53) {
            tree.insert(item);
        }
        // only a copy with the right bounds and id is at hand
        let items = random_items(20, 53);
        assert!(tree.remove_by(&items[7], |a, b| a.0 == b.0));
        assert_eq!(tree.size(), 19);
        assert!(!tree.all().iter().any(|it| it.0 == 7));
    }

    #[test]
    fn remove_only_first_match() {
        let mut tree = new_tree(0);
        let rect = Aabb::new(1.0, 1.0, 2.0, 2.0);
        tree.insert((1, rect));
        tree.insert((1, rect));
        assert!(tree.remove(&(1, rect)));
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn insert_remove_round_trip() {
        let mut tree = new_tree(0);
        let items = random_items(200, 59);
        for item in items.clone() {
            tree.insert(item);
        }

        for item in items.iter().rev() {
            assert!(tree.remove(item));
            check_structure(&tree);
        }

        assert_eq!(tree.size(), 0);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.bounds(), Aabb::EMPTY);
    }

    #[test]
    fn remove_from_bulk_loaded_tree() {
        let items = random_items(300, 61);
        let mut tree = new_tree(0);
        tree.bulk_load(items.clone());

        for item in &items[..150] {
            assert!(tree.remove(item));
        }
        assert_eq!(tree.size(), 150);
        check_structure(&tree);
        assert_eq!(sorted_ids(&tree.all()), (150..300).collect::<Vec<_>>());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut tree = new_tree(0);
        for item in random_items(50, 67) {
            tree.insert(item);
        }
        tree.clear();
        assert_eq!(tree.size(), 0);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.bounds(), Aabb::EMPTY);

        tree.clear();
        assert_eq!(tree.size(), 0);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.bounds(), Aabb::EMPTY);
    }

    #[test]
    fn reuses_released_nodes() {
        let mut tree = new_tree(4);
        let items = random_items(64, 71);
        for item in items.clone() {
            tree.insert(item);
        }
        let arena_size = tree.nodes.len();

        for item in items.iter() {
            tree.remove(item);
        }
        for item in items.clone() {
            tree.insert(item);
        }
        check_structure(&tree);
        // the round trip must not grow the arena past its high-water mark
        assert!(tree.nodes.len() <= arena_size + 1);
    }
}
