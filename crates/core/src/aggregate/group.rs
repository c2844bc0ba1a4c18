//! Generic group → accumulate → finalize → sort → truncate pipeline.
//!
//! Every aggregate in pulseboard (dashboard charts, grouped statistics, global
//! statistics) is an instance of this pipeline with a different key extractor
//! and value extractor.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Running sums for one group key across `N` metrics.
///
/// Each metric keeps its own sample count, so a `None` value is excluded from
/// that metric's mean without affecting the group's record count.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<K, const N: usize> {
    pub key: K,
    /// Records folded into this group.
    pub count: usize,
    sums: [f64; N],
    samples: [usize; N],
}

impl<K, const N: usize> Group<K, N> {
    fn new(key: K) -> Self {
        Self {
            key,
            count: 0,
            sums: [0.0; N],
            samples: [0; N],
        }
    }

    fn accumulate(&mut self, values: [Option<f64>; N]) {
        self.count += 1;
        for (i, value) in values.into_iter().enumerate() {
            if let Some(v) = value {
                self.sums[i] += v;
                self.samples[i] += 1;
            }
        }
    }

    /// Sum of metric `i` over the samples present.
    pub fn sum(&self, i: usize) -> f64 {
        self.sums[i]
    }

    /// Mean of metric `i`, or `None` when no record supplied a value.
    pub fn mean(&self, i: usize) -> Option<f64> {
        (self.samples[i] > 0).then(|| self.sums[i] / self.samples[i] as f64)
    }
}

/// Groups `items` by `key`, folding `values` into per-group sums.
///
/// Items whose key extractor returns `None` are skipped. Groups come back in
/// first-seen order, which later stable sorts preserve for ties.
pub fn group_by<T, K, const N: usize>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> Option<K>,
    values: impl Fn(&T) -> [Option<f64>; N],
) -> Vec<Group<K, N>>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<K, N>> = Vec::new();
    for item in items {
        let Some(k) = key(&item) else { continue };
        let slot = match index.get(&k) {
            Some(&slot) => slot,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(Group::new(k));
                groups.len() - 1
            }
        };
        groups[slot].accumulate(values(&item));
    }
    groups
}

/// Sort direction for [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Stable-sorts `items` by `score` and keeps at most `limit` of them.
///
/// Incomparable scores (NaN) are treated as equal.
pub fn rank<T, S: PartialOrd>(
    mut items: Vec<T>,
    score: impl Fn(&T) -> S,
    order: Order,
    limit: Option<usize>,
) -> Vec<T> {
    items.sort_by(|a, b| {
        let ord = score(a).partial_cmp(&score(b)).unwrap_or(Ordering::Equal);
        match order {
            Order::Ascending => ord,
            Order::Descending => ord.reverse(),
        }
    });
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Rounds to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
