//! Per-symbol price series with sorted export and windowed statistics.

pub mod aggregates;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod series;
pub mod tree;
pub mod window;

pub use aggregates::{RunningAggregates, StatsResponse, StatsResult};
pub use catalog::SeriesCatalog;
pub use config::ServiceConfig;
pub use error::{ErrorCategory, ServiceError};
pub use series::SeriesIndex;
pub use tree::BalancedSeriesTree;
