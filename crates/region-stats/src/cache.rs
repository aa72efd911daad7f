//! Memoized region means, one result column per (scenario, year).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use shape_cutter::{CutOutcome, GriddedField, ShapeCutter};
use tracing::{debug, info, instrument};

use crate::config::RegionStatsConfig;
use crate::error::{RegionStatsError, Result};
use crate::executor::Executor;
use crate::sources::{FieldSource, RegionSource};
use crate::table::{ColumnKey, RegionRow, RegionSummary, RegionTable, ResultColumn};

/// Statistics about the result-column cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from an existing column.
    pub column_hits: u64,
    /// Columns computed from scratch.
    pub column_misses: u64,
    /// Per-region mean computations run inside column batches.
    pub region_evaluations: u64,
    /// Columns currently held.
    pub columns: usize,
}

impl CacheStats {
    /// Calculate the column hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.column_hits + self.column_misses;
        if total == 0 {
            0.0
        } else {
            self.column_hits as f64 / total as f64
        }
    }
}

/// Owns one field per scenario and the region table, and answers mean
/// queries over them.
///
/// Columns are computed at most once: concurrent callers asking for the
/// same missing column wait for the first one to finish.
pub struct RegionMeanCache {
    fields: HashMap<String, GriddedField>,
    table: RwLock<RegionTable>,
    compute: Mutex<()>,
    cutter: ShapeCutter,
    executor: Executor,
    config: RegionStatsConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evaluations: AtomicU64,
}

impl RegionMeanCache {
    /// Build a cache over already loaded data.
    ///
    /// Scenario names are case-insensitive.
    pub fn new(
        fields: HashMap<String, GriddedField>,
        table: RegionTable,
        config: RegionStatsConfig,
    ) -> Result<Self> {
        config.validate().map_err(RegionStatsError::Config)?;
        let executor = Executor::from_workers(config.workers)?;

        let fields = fields
            .into_iter()
            .map(|(name, field)| (name.to_lowercase(), field))
            .collect();

        Ok(Self {
            fields,
            table: RwLock::new(table),
            compute: Mutex::new(()),
            cutter: ShapeCutter::new(),
            executor,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evaluations: AtomicU64::new(0),
        })
    }

    /// Load every scenario and the region table up front.
    pub fn load(
        fields: &dyn FieldSource,
        regions: &dyn RegionSource,
        config: RegionStatsConfig,
    ) -> Result<Self> {
        let start = Instant::now();

        let table = RegionTable::new(regions.load_regions()?)?;
        let fields = fields
            .scenarios()
            .into_iter()
            .map(|scenario| {
                let field = fields.load_field(&scenario)?;
                Ok((scenario, field))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        info!(
            scenarios = fields.len(),
            regions = table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Region mean cache loaded"
        );

        Self::new(fields, table, config)
    }

    pub fn config(&self) -> &RegionStatsConfig {
        &self.config
    }

    /// Known scenario names, sorted.
    pub fn scenarios(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.keys().cloned().collect();
        names.sort();
        names
    }

    /// The field for `scenario`, or a fault if there is none.
    pub fn field(&self, scenario: &str) -> Result<&GriddedField> {
        self.fields
            .get(&scenario.trim().to_lowercase())
            .ok_or_else(|| RegionStatsError::UnknownScenario(scenario.to_string()))
    }

    /// Years available for `scenario`.
    pub fn years(&self, scenario: &str) -> Result<Vec<i32>> {
        Ok(self.field(scenario)?.years()?)
    }

    /// Summaries of every region, in table order.
    pub fn regions(&self) -> Vec<RegionSummary> {
        self.read_table().rows().iter().map(RegionRow::summary).collect()
    }

    /// Mean of `scenario` over `region` in `year`; `None` means no data.
    ///
    /// Answers from a computed column when there is one. Otherwise the value
    /// is computed directly and not cached.
    #[instrument(skip(self), level = "debug")]
    pub fn mean(&self, region: &str, scenario: &str, year: i32) -> Result<Option<f64>> {
        let key = ColumnKey::new(scenario, year);
        let table = self.read_table();
        let row = table.row(region)?;

        if let Some(column) = table.column(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(column.get(region).copied().flatten());
        }

        let field = self.year_field(scenario, year)?;
        self.region_mean(&field, row, &key)
    }

    /// Means of every region for one scenario and year.
    ///
    /// The column is computed once, fanned out over the executor, then
    /// appended to the table; later calls return the stored column. Regions
    /// that fail are recorded as no data and do not abort the batch.
    pub fn compute_column(&self, scenario: &str, year: i32) -> Result<Arc<ResultColumn>> {
        let key = ColumnKey::new(scenario, year);

        if let Some(column) = self.cached(&key) {
            return Ok(column);
        }

        let _guard = self.compute.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(column) = self.cached(&key) {
            return Ok(column);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        // Faults common to every region surface before the fan-out.
        let field = self.year_field(scenario, year)?;

        let column: ResultColumn = {
            let table = self.read_table();
            self.executor
                .map(table.rows(), |row| {
                    self.evaluations.fetch_add(1, Ordering::Relaxed);
                    let value = match self.region_mean(&field, row, &key) {
                        Ok(value) => value,
                        Err(e) => {
                            self.config
                                .diagnostics
                                .region_fault(&row.code, &key.to_string(), &e);
                            None
                        }
                    };
                    (row.code.clone(), value)
                })
                .into_iter()
                .collect()
        };

        let with_data = column.values().filter(|v| v.is_some()).count();
        let stored = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_column(key.clone(), column);

        info!(
            column = %key,
            regions = stored.len(),
            with_data,
            threads = self.executor.threads(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed result column"
        );

        Ok(stored)
    }

    /// A previously computed column, without computing anything.
    pub fn column(&self, scenario: &str, year: i32) -> Option<Arc<ResultColumn>> {
        self.read_table().column(&ColumnKey::new(scenario, year))
    }

    /// Keys of every computed column, in order.
    pub fn column_keys(&self) -> Vec<ColumnKey> {
        self.read_table().column_keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            column_hits: self.hits.load(Ordering::Relaxed),
            column_misses: self.misses.load(Ordering::Relaxed),
            region_evaluations: self.evaluations.load(Ordering::Relaxed),
            columns: self.read_table().column_count(),
        }
    }

    /// One year of a scenario with horizontal bounds inferred once, so
    /// every region cut borrows it.
    fn year_field(&self, scenario: &str, year: i32) -> Result<GriddedField> {
        let mut field = self.field(scenario)?.extract_year(year)?;
        field.guess_horizontal_bounds()?;
        Ok(field)
    }

    fn cached(&self, key: &ColumnKey) -> Option<Arc<ResultColumn>> {
        let column = self.read_table().column(key)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(column)
    }

    /// Cut the single-year field to one region and average what is left.
    fn region_mean(
        &self,
        field: &GriddedField,
        row: &RegionRow,
        key: &ColumnKey,
    ) -> Result<Option<f64>> {
        match self.cutter.cut(field, &row.geometry)? {
            CutOutcome::Masked(masked) => {
                let mean = masked.mean();
                debug!(
                    region = %row.code,
                    column = %key,
                    cells = masked.cells_inside(),
                    mean = ?mean,
                    "Region mean"
                );
                Ok(mean)
            }
            CutOutcome::NoCoverage(reason) => {
                self.config
                    .diagnostics
                    .region_uncovered(&row.code, &format!("{key} ({reason})"));
                Ok(None)
            }
        }
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, RegionTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RegionMeanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionMeanCache")
            .field("scenarios", &self.scenarios())
            .field("executor", &self.executor)
            .field("stats", &self.stats())
            .finish()
    }
}
