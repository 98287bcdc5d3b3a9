use tracing::trace;

use crate::aggregates::{RunningAggregates, StatsResult};
use crate::tree::BalancedSeriesTree;
use crate::window::{summarize, InsertionLog, WindowCache};

/// Everything stored for one symbol.
#[derive(Debug, Default)]
pub struct SeriesIndex {
    tree: BalancedSeriesTree,
    aggregates: RunningAggregates,
    log: InsertionLog,
    cache: WindowCache,
}

impl SeriesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_one(&mut self, value: f64) {
        self.tree.insert(value);
        self.aggregates.record(value);
        self.log.append(value);
        self.cache.invalidate();
    }

    /// Values are applied oldest to newest. Callers validate beforehand;
    /// nothing here rejects or rolls back.
    pub fn insert_batch(&mut self, values: &[f64]) {
        for &value in values {
            self.insert_one(value);
        }
    }

    /// Stats over the last `10^window_exponent` values, or the whole history
    /// for `None`.
    pub fn stats(&mut self, window_exponent: Option<u32>) -> StatsResult {
        let window_length = window_exponent.map(|k| 10u64.checked_pow(k).unwrap_or(u64::MAX));
        self.window_stats(window_length)
    }

    pub fn window_stats(&mut self, window_length: Option<u64>) -> StatsResult {
        let Some(window_length) = window_length else {
            return self.aggregates.snapshot();
        };
        if self.log.is_empty() {
            return StatsResult::Empty;
        }

        if let Some(stats) = self.cache.get(window_length) {
            trace!(window_length, "window cache hit");
            return StatsResult::Populated(stats);
        }

        let result = summarize(self.log.tail(window_length));
        if let StatsResult::Populated(stats) = result {
            self.cache.store(window_length, stats);
        }
        result
    }

    pub fn ascending_values(&self) -> Vec<f64> {
        self.tree.export_ascending()
    }

    /// Number of inserted values, duplicates included.
    pub fn len(&self) -> u64 {
        self.aggregates.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cached_window(&self) -> Option<u64> {
        self.cache.cached_length()
    }

    pub fn multiplicity(&self, value: f64) -> u32 {
        self.tree.multiplicity(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::StatsResponse;
    use proptest::prelude::*;

    const DELTA: f64 = 1e-6;

    fn assert_float_eq(a: f64, b: f64) {
        assert!((a - b).abs() < DELTA, "{} != {}", a, b);
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-8 * a.abs().max(b.abs()).max(1.0)
    }

    fn reference(values: &[f64]) -> StatsResponse {
        let n = values.len() as f64;
        let avg = values.iter().sum::<f64>() / n;
        StatsResponse {
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            last: values[values.len() - 1],
            avg,
            var: values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n,
            size: values.len() as u64,
        }
    }

    fn matches_reference(actual: StatsResponse, expected: StatsResponse) -> bool {
        close(actual.min, expected.min)
            && close(actual.max, expected.max)
            && actual.last == expected.last
            && close(actual.avg, expected.avg)
            && close(actual.var, expected.var)
            && actual.size == expected.size
    }

    fn aapl() -> SeriesIndex {
        let mut index = SeriesIndex::new();
        index.insert_batch(&[150.1, 152.3, 151.0, 155.4, 149.8]);
        index
    }

    #[test]
    fn test_empty_index() {
        let mut index = SeriesIndex::new();
        assert!(index.is_empty());
        assert!(index.stats(None).is_empty());
        assert!(index.stats(Some(3)).is_empty());
        assert!(index.ascending_values().is_empty());
        assert_eq!(index.cached_window(), None);
    }

    #[test]
    fn test_add_batch_and_get_stats() {
        let mut index = aapl();
        for k in [None, Some(1), Some(2), Some(8)] {
            let stats = index.stats(k).populated().unwrap();
            assert_float_eq(149.8, stats.min);
            assert_float_eq(155.4, stats.max);
            assert_float_eq(149.8, stats.last);
            assert_float_eq(151.72, stats.avg);
            assert_float_eq(4.1416, stats.var);
            assert_eq!(stats.size, 5);
        }
        assert_eq!(
            index.ascending_values(),
            vec![149.8, 150.1, 151.0, 152.3, 155.4]
        );
    }

    #[test]
    fn test_window_uses_arrival_order() {
        let mut index = SeriesIndex::new();
        let values: Vec<f64> = (1..=25).map(|i| i as f64).collect();
        index.insert_batch(&values);

        let stats = index.stats(Some(1)).populated().unwrap();
        assert_float_eq(16.0, stats.min);
        assert_float_eq(25.0, stats.max);
        assert_float_eq(25.0, stats.last);
        assert_float_eq(20.5, stats.avg);
        assert_float_eq(8.25, stats.var);
        assert_eq!(stats.size, 10);

        let all = index.stats(Some(2)).populated().unwrap();
        assert_eq!(all.size, 25);
        assert_float_eq(1.0, all.min);
    }

    #[test]
    fn test_window_ignores_sort_order() {
        let mut index = SeriesIndex::new();
        let mut values = vec![1.0; 10];
        values.extend([500.0, 0.5]);
        index.insert_batch(&values);
        index.insert_batch(&[2.0; 9]);

        let stats = index.stats(Some(1)).populated().unwrap();
        assert_float_eq(0.5, stats.min);
        assert_float_eq(2.0, stats.max);
        assert_float_eq(2.0, stats.last);
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let mut index = aapl();
        let first = index.stats(Some(1)).populated().unwrap();
        assert_eq!(index.cached_window(), Some(10));

        let second = index.stats(Some(1)).populated().unwrap();
        assert_eq!(first.var.to_bits(), second.var.to_bits());
        assert_eq!(first, second);

        index.insert_one(200.0);
        assert_eq!(index.cached_window(), None);

        let third = index.stats(Some(1)).populated().unwrap();
        assert_eq!(third.size, 6);
        assert_float_eq(200.0, third.last);
        assert_float_eq(200.0, third.max);
    }

    #[test]
    fn test_cache_replaced_by_other_window() {
        let mut index = aapl();
        index.stats(Some(1));
        index.stats(Some(4));
        assert_eq!(index.cached_window(), Some(10_000));
        // whole-history queries bypass the cache
        index.stats(None);
        assert_eq!(index.cached_window(), Some(10_000));
    }

    #[test]
    fn test_duplicates() {
        let mut index = SeriesIndex::new();
        index.insert_one(10.0);
        let before = index.stats(None).populated().unwrap().size;
        index.insert_one(42.5);
        index.insert_one(42.5);

        assert_eq!(index.stats(None).populated().unwrap().size, before + 2);
        assert_eq!(index.multiplicity(42.5), 2);
        assert_eq!(index.ascending_values(), vec![10.0, 42.5, 42.5]);
    }

    #[test]
    fn test_huge_exponent_saturates() {
        let mut index = aapl();
        let stats = index.stats(Some(40)).populated().unwrap();
        assert_eq!(stats.size, 5);
    }

    #[test]
    fn test_export_is_idempotent() {
        let index = aapl();
        assert_eq!(index.ascending_values(), index.ascending_values());
    }

    fn prices() -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(0.01f64..1000.0, 1..300)
    }

    proptest! {
        #[test]
        fn global_stats_match_reference(values in prices()) {
            let mut index = SeriesIndex::new();
            index.insert_batch(&values);
            let stats = index.stats(None).populated().unwrap();
            prop_assert!(matches_reference(stats, reference(&values)), "{:?}", stats);
        }

        #[test]
        fn window_stats_match_reference(values in prices(), k in 1u32..=3) {
            let mut index = SeriesIndex::new();
            index.insert_batch(&values);
            let n = (10usize.pow(k)).min(values.len());
            let expected = reference(&values[values.len() - n..]);
            let stats = index.stats(Some(k)).populated().unwrap();
            prop_assert!(matches_reference(stats, expected), "{:?}", stats);
        }

        #[test]
        fn sorted_export_is_permutation(values in prices()) {
            let mut index = SeriesIndex::new();
            index.insert_batch(&values);
            let exported = index.ascending_values();
            prop_assert!(exported.windows(2).all(|w| w[0] <= w[1]));

            let mut expected = values.clone();
            expected.sort_by(f64::total_cmp);
            prop_assert_eq!(exported, expected);
        }

        #[test]
        fn cache_never_serves_stale(first in prices(), second in prices(), k in 1u32..=2) {
            let mut index = SeriesIndex::new();
            index.insert_batch(&first);
            index.stats(Some(k));
            index.insert_batch(&second);

            let mut all = first.clone();
            all.extend(&second);
            let n = (10usize.pow(k)).min(all.len());
            let stats = index.stats(Some(k)).populated().unwrap();
            prop_assert!(matches_reference(stats, reference(&all[all.len() - n..])));
            prop_assert_eq!(index.stats(Some(k)).populated().unwrap(), stats);
        }
    }
}
