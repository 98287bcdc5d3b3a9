use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::aggregates::StatsResult;
use crate::config::LimitsConfig;
use crate::error::{Result, ServiceError};
use crate::series::SeriesIndex;

pub const MIN_WINDOW_EXPONENT: u32 = 1;
pub const MAX_WINDOW_EXPONENT: u32 = 8;

/// Symbol to series map. The map lock guards create/delete/clear/list; each
/// series has its own lock. Always map first, then series.
pub struct SeriesCatalog {
    limits: LimitsConfig,
    series: RwLock<HashMap<String, Arc<Mutex<SeriesIndex>>>>,
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl SeriesCatalog {
    pub fn new(limits: LimitsConfig) -> Self {
        SeriesCatalog {
            limits,
            series: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert_batch(&self, symbol: &str, values: &[f64]) -> Result<()> {
        self.validate_symbol(symbol)?;
        self.validate_batch(values)?;

        {
            let series = self.series.read().await;
            if let Some(index) = series.get(symbol) {
                index.lock().await.insert_batch(values);
                debug!(symbol, count = values.len(), "batch ingested");
                return Ok(());
            }
        }

        let mut series = self.series.write().await;
        let symbol_count = series.len();
        match series.entry(symbol.to_string()) {
            Entry::Occupied(entry) => {
                entry.get().lock().await.insert_batch(values);
            }
            Entry::Vacant(entry) => {
                if symbol_count >= self.limits.max_symbols {
                    return Err(ServiceError::SymbolLimitExceeded {
                        max: self.limits.max_symbols,
                    });
                }
                let mut index = SeriesIndex::new();
                index.insert_batch(values);
                entry.insert(Arc::new(Mutex::new(index)));
                info!(symbol, "symbol created");
            }
        }
        debug!(symbol, count = values.len(), "batch ingested");
        Ok(())
    }

    pub async fn get_stats(&self, symbol: &str, k: i64) -> Result<StatsResult> {
        let exponent = u32::try_from(k)
            .ok()
            .filter(|k| (MIN_WINDOW_EXPONENT..=MAX_WINDOW_EXPONENT).contains(k))
            .ok_or(ServiceError::ExponentOutOfRange {
                k,
                min: MIN_WINDOW_EXPONENT,
                max: MAX_WINDOW_EXPONENT,
            })?;

        let series = self.series.read().await;
        let index = series
            .get(symbol)
            .ok_or_else(|| ServiceError::SymbolNotFound(symbol.to_string()))?;
        let stats = index.lock().await.stats(Some(exponent));
        debug!(symbol, k, "stats computed");
        Ok(stats)
    }

    pub async fn get_series(&self, symbol: &str) -> Result<Vec<f64>> {
        let series = self.series.read().await;
        let index = series
            .get(symbol)
            .ok_or_else(|| ServiceError::SymbolNotFound(symbol.to_string()))?;
        let values = index.lock().await.ascending_values();
        Ok(values)
    }

    pub async fn delete_symbol(&self, symbol: &str) -> Result<()> {
        let mut series = self.series.write().await;
        series
            .remove(symbol)
            .ok_or_else(|| ServiceError::SymbolNotFound(symbol.to_string()))?;
        info!(symbol, "symbol deleted");
        Ok(())
    }

    pub async fn list_symbols(&self) -> Vec<String> {
        let series = self.series.read().await;
        let mut symbols: Vec<String> = series.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub async fn clear_all(&self) {
        let mut series = self.series.write().await;
        let removed = series.len();
        series.clear();
        info!(removed, "catalog cleared");
    }

    fn validate_symbol(&self, symbol: &str) -> Result<()> {
        if symbol.is_empty() {
            return Err(ServiceError::EmptySymbol);
        }
        if symbol.chars().count() > self.limits.max_symbol_len {
            return Err(ServiceError::SymbolTooLong {
                max: self.limits.max_symbol_len,
            });
        }
        Ok(())
    }

    fn validate_batch(&self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ServiceError::BatchEmpty);
        }
        if values.len() > self.limits.max_batch_size {
            return Err(ServiceError::BatchTooLarge {
                max: self.limits.max_batch_size,
                actual: values.len(),
            });
        }
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ServiceError::NonFiniteValue { index });
            }
            if value < 0.0 {
                return Err(ServiceError::NegativeValue { index, value });
            }
        }
        Ok(())
    }
}
