//! Ordering of sibling nodes by their last search results.
//!
//! Siblings stamped with a deeper search always come first. Within a depth, siblings are ordered
//! by value from the chooser's point of view, optionally breaking ties by path length.

use std::cmp::Ordering;

use super::node::NodeId;

/// Sorting strategy used for presorting and postsorting children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMethod {
    /// Stable library sort over the full ordering.
    Default,
    /// Repeated adjacent swaps until a pass makes none.
    Bubble,
    /// Bubble passes that stop at the first sibling with an older depth stamp, so stale
    /// siblings at the tail are left in place.
    BubbleEfficient,
}

impl Default for SortMethod {
    fn default() -> Self {
        SortMethod::Default
    }
}

/// Direction in which the chooser prefers values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest value first.
    Descending,
    /// Lowest value first.
    Ascending,
}

/// Sort key of one sibling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub id: NodeId,
    pub depth: Option<usize>,
    pub value: f64,
    pub path_length: usize,
}

impl Ranked {
    /// Value as seen by the chooser: higher is always better.
    #[inline]
    fn chooser_value(&self, order: SortOrder) -> f64 {
        match order {
            SortOrder::Descending => self.value,
            SortOrder::Ascending => -self.value,
        }
    }
}

/// Returns `Less` when `a` should be ordered before `b`.
pub fn compare(a: &Ranked, b: &Ranked, order: SortOrder, prune_by_path_length: bool) -> Ordering {
    match b.depth.cmp(&a.depth) {
        Ordering::Equal => {}
        other => return other,
    }
    let (av, bv) = (a.chooser_value(order), b.chooser_value(order));
    match bv.partial_cmp(&av).unwrap_or(Ordering::Equal) {
        Ordering::Equal if prune_by_path_length => {
            // Winning lines are best short, losing lines are best long.
            if av > 0.0 {
                a.path_length.cmp(&b.path_length)
            } else if av < 0.0 {
                b.path_length.cmp(&a.path_length)
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

pub fn sort(list: &mut [Ranked], method: SortMethod, order: SortOrder, prune_by_path_length: bool) {
    match method {
        SortMethod::Default => {
            list.sort_by(|a, b| compare(a, b, order, prune_by_path_length));
        }
        SortMethod::Bubble => bubble_sort(list, order, prune_by_path_length, false),
        SortMethod::BubbleEfficient => bubble_sort(list, order, prune_by_path_length, true),
    }
}

fn bubble_sort(list: &mut [Ranked], order: SortOrder, prune_by_path_length: bool, stop_at_stale: bool) {
    loop {
        let mut swapped = false;
        for i in 1..list.len() {
            if stop_at_stale && list[i].depth < list[i - 1].depth {
                break;
            }
            if compare(&list[i - 1], &list[i], order, prune_by_path_length) == Ordering::Greater {
                list.swap(i - 1, i);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}
