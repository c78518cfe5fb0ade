//! Core domain types and abstractions

pub mod cache;
pub mod config;
pub mod indicator;
pub mod log;
pub mod sector;
pub mod series;
pub mod status;

// Re-export main types for cleaner imports
pub use cache::{CacheInfo, CacheStore, StoredEntry};
pub use indicator::{Direction, Indicator, Weights};
pub use sector::{MARKET_BENCHMARK, Sector};
pub use series::{ObservationSeries, PriceDataset, PriceHistory, SectorSeriesMap, SectorValueMap};
pub use status::{HealthState, Source, SourceStatus};
