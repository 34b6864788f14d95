//! Grouped weighted-mean reduction
//!
//! Shared by the per-shock collapse aggregate and the per-region REHI
//! aggregate. A group whose weights sum to zero reports a mean of 0 rather
//! than NaN; the group is still emitted.

use std::collections::HashMap;
use std::hash::Hash;

/// Running weighted sum for one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedAccumulator {
    pub weighted_sum: f64,
    pub total_weight: f64,
    pub count: usize,
}

impl WeightedAccumulator {
    pub fn add(&mut self, value: f64, weight: f64) {
        self.weighted_sum += value * weight;
        self.total_weight += weight;
        self.count += 1;
    }

    /// `Σ(v·w) / Σw`, or 0 when `Σw` is zero
    pub fn mean(&self) -> f64 {
        if self.total_weight == 0.0 {
            0.0
        } else {
            self.weighted_sum / self.total_weight
        }
    }
}

/// Weighted mean of one group
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGroup<K> {
    pub key: K,
    pub mean: f64,
    pub total_weight: f64,
    pub count: usize,
}

/// Group `items` by `key`, and reduce each group to the mean of `value`
/// weighted by `weight`.
///
/// Groups are returned in order of first appearance.
pub fn weighted_mean_by<'a, T, K, FK, FW, FV>(
    items: impl IntoIterator<Item = &'a T>,
    key: FK,
    weight: FW,
    value: FV,
) -> Vec<WeightedGroup<K>>
where
    T: 'a,
    K: Eq + Hash + Clone,
    FK: Fn(&T) -> K,
    FW: Fn(&T) -> f64,
    FV: Fn(&T) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, WeightedAccumulator)> = Vec::new();

    for item in items {
        let k = key(item);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, WeightedAccumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.add(value(item), weight(item));
    }

    groups
        .into_iter()
        .map(|(key, acc)| WeightedGroup {
            key,
            mean: acc.mean(),
            total_weight: acc.total_weight,
            count: acc.count,
        })
        .collect()
}
