use crate::aggregates::{StatsResponse, StatsResult};

/// Raw values in arrival order. Tree order loses recency, so "last N"
/// queries read from here.
#[derive(Debug, Default)]
pub struct InsertionLog {
    values: Vec<f64>,
}

impl InsertionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The most recent `n` values, oldest first. Shorter if fewer exist.
    pub fn tail(&self, n: u64) -> &[f64] {
        let n = usize::try_from(n).unwrap_or(usize::MAX).min(self.values.len());
        &self.values[self.values.len() - n..]
    }
}

/// Single-slot memo of the last window query.
#[derive(Debug, Default)]
pub struct WindowCache {
    entry: Option<(u64, StatsResponse)>,
}

impl WindowCache {
    pub fn get(&self, window_length: u64) -> Option<StatsResponse> {
        match self.entry {
            Some((cached_length, stats)) if cached_length == window_length => Some(stats),
            _ => None,
        }
    }

    pub fn store(&mut self, window_length: u64, stats: StatsResponse) {
        self.entry = Some((window_length, stats));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn cached_length(&self) -> Option<u64> {
        self.entry.map(|(length, _)| length)
    }
}

/// Aggregates over an arbitrary slice. Variance is taken around the slice's
/// own mean; the global Welford state does not apply to a suffix.
pub fn summarize(values: &[f64]) -> StatsResult {
    let Some(&last) = values.last() else {
        return StatsResult::Empty;
    };

    let (min, max, sum) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
    );
    let n = values.len() as f64;
    let avg = sum / n;
    let var = if values.len() > 1 {
        values.iter().map(|&v| (v - avg) * (v - avg)).sum::<f64>() / n
    } else {
        0.0
    };

    StatsResult::Populated(StatsResponse {
        min,
        max,
        last,
        avg,
        var,
        size: values.len() as u64,
    })
}
