//! Per-region mean temperatures for climate scenarios.
//!
//! [`RegionMeanCache`] owns one gridded field per scenario and a table of
//! region outlines. It answers `mean(region, scenario, year)` queries and
//! fills whole `(scenario, year)` result columns in parallel, computing
//! each column at most once.
//!
//! ```text
//! FieldSource ──┐
//!               ├─► RegionMeanCache::load
//! RegionSource ─┘          │
//!                          ├─► mean(region, scenario, year)
//!                          │
//!                          └─► compute_column(scenario, year)
//!                                   │
//!                                   ├─► extract year
//!                                   ├─► Executor::map(regions, ShapeCutter::cut + mean)
//!                                   └─► append column to RegionTable
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod sources;
pub mod table;

pub use cache::{CacheStats, RegionMeanCache};
pub use config::{DiagnosticsLevel, RegionStatsConfig};
pub use error::{RegionStatsError, Result};
pub use executor::Executor;
pub use sources::{
    FieldDocument, FieldSource, FileFieldSource, FileRegionSource, RegionRecord, RegionSource,
};
pub use table::{ColumnKey, RegionRow, RegionSummary, RegionTable, ResultColumn};
