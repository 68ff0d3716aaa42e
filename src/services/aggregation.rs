//! Ordering applied once after every unit of work has been collected.

/// Ascending natural order: oldest first
pub fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items
}

pub fn most_recent_first<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| b.cmp(a));
    items
}

/// The first `min(n, len)` entries of the most-recent-first order
pub fn top_n<T: Ord>(items: Vec<T>, n: usize) -> Vec<T> {
    let mut items = most_recent_first(items);
    items.truncate(n);
    items
}
