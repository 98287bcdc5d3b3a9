use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub min: f64,
    pub max: f64,
    pub last: f64,
    pub avg: f64,
    pub var: f64,
    pub size: u64,
}

/// Stats for a series, or an explicit marker that nothing has been recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsResult {
    Empty,
    Populated(StatsResponse),
}

impl StatsResult {
    pub fn populated(self) -> Option<StatsResponse> {
        match self {
            StatsResult::Empty => None,
            StatsResult::Populated(stats) => Some(stats),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatsResult::Empty)
    }
}

/// Whole-history statistics updated in O(1) per value (Welford).
#[derive(Debug, Clone)]
pub struct RunningAggregates {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
    mean: f64,
    sum_sq_dev: f64,
    last_value: f64,
}

impl Default for RunningAggregates {
    fn default() -> Self {
        RunningAggregates {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
            mean: 0.0,
            sum_sq_dev: 0.0,
            last_value: 0.0,
        }
    }
}

impl RunningAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.last_value = value;
        self.count += 1;
        self.sum += value;

        let old_mean = self.mean;
        self.mean = self.sum / self.count as f64;
        if self.count > 1 {
            self.sum_sq_dev += (value - old_mean) * (value - self.mean);
        }
    }

    /// Number of recorded values, duplicates included.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn snapshot(&self) -> StatsResult {
        if self.count == 0 {
            return StatsResult::Empty;
        }
        let var = if self.count > 1 {
            self.sum_sq_dev / self.count as f64
        } else {
            0.0
        };
        StatsResult::Populated(StatsResponse {
            min: self.min,
            max: self.max,
            last: self.last_value,
            avg: self.mean,
            var,
            size: self.count,
        })
    }
}
