// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partial sorting: quickselect and the group partitioner feeding the
//! bulk builder.

use crate::types::Aabb;

/// Partially sort `a` so that the element at `n` is the one a full sort
/// would put there, everything before it compares ≤ and everything after
/// compares ≥. The pivot is drawn uniformly from the remaining range.
/// Expected O(N); not stable.
pub(crate) fn quickselect<E, L>(a: &mut [E], n: usize, rng: &mut fastrand::Rng, less: &mut L)
where
    L: FnMut(&E, &E) -> bool,
{
    let mut first = 0;
    let mut last = a.len() - 1;
    loop {
        let guess = rng.usize(first..=last);
        let pivot = partition(a, first, last, guess, less);
        if n == pivot {
            return;
        }
        if n < pivot {
            last = pivot - 1;
        } else {
            first = pivot + 1;
        }
    }
}

/// Hoare-style partition: move everything smaller than the pivot to its
/// left and everything bigger to its right. Returns the pivot's final
/// position.
fn partition<E, L>(a: &mut [E], first: usize, last: usize, pivot: usize, less: &mut L) -> usize
where
    L: FnMut(&E, &E) -> bool,
{
    a.swap(first, pivot);
    let pivot = first;

    let mut left = first + 1;
    let mut right = last;

    while left <= right {
        while left <= last && less(&a[left], &a[pivot]) {
            left += 1;
        }
        while right > pivot && less(&a[pivot], &a[right]) {
            right -= 1;
        }
        if left <= right {
            a.swap(left, right);
            left += 1;
            right -= 1;
        }
    }
    a.swap(pivot, right);
    right
}

/// Partially sort `items` into runs of `group_size` consecutive
/// positions: the runs are ordered between each other by the min
/// coordinate on `axis` (0 = x, 1 = y), the items inside a run are not.
/// Iterative divide and conquer, always selecting the central group
/// boundary as the pivot.
pub(crate) fn group_items<T, F>(
    items: &mut [T],
    group_size: usize,
    axis: usize,
    bounds_fn: &F,
    rng: &mut fastrand::Rng,
) where
    F: Fn(&T) -> Aabb,
{
    let mut stack = vec![0, items.len() - 1];
    while let Some(right_idx) = stack.pop() {
        let left_idx = stack.pop().expect("bounds are pushed in pairs");

        let size = right_idx - left_idx;
        if size <= group_size {
            continue;
        }

        let groups = size as f64 / group_size as f64;
        let pivot = ((groups / 2.0).ceil() as usize) * group_size;
        quickselect(&mut items[left_idx..=right_idx], pivot, rng, &mut |a, b| {
            bounds_fn(a).min_on(axis) < bounds_fn(b).min_on(axis)
        });

        let pivot = pivot + left_idx;
        stack.extend_from_slice(&[left_idx, pivot, pivot, right_idx]);
    }
}
