//! Region table and its write-once result columns.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use shape_cutter::RegionGeometry;

use crate::error::{RegionStatsError, Result};

/// Identifies one result column: a scenario and a calendar year.
///
/// Displays and parses as `"<scenario>,<year>"`. Scenario names are
/// case-insensitive and stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    scenario: String,
    year: i32,
}

impl ColumnKey {
    pub fn new(scenario: &str, year: i32) -> Self {
        Self {
            scenario: scenario.trim().to_lowercase(),
            year,
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.scenario, self.year)
    }
}

impl FromStr for ColumnKey {
    type Err = RegionStatsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RegionStatsError::InvalidColumnKey(s.to_string());
        let (scenario, year) = s.split_once(',').ok_or_else(invalid)?;
        if scenario.trim().is_empty() {
            return Err(invalid());
        }
        let year = year.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(scenario, year))
    }
}

/// Region code to mean, `None` where the region has no data.
pub type ResultColumn = BTreeMap<String, Option<f64>>;

/// One named region and its outline.
#[derive(Debug, Clone)]
pub struct RegionRow {
    pub code: String,
    pub name: String,
    pub geometry: RegionGeometry,
    /// Planar area in square degrees.
    pub area: f64,
    /// Centroid latitude, absent for an empty outline.
    pub latitude: Option<f64>,
    /// Centroid longitude, absent for an empty outline.
    pub longitude: Option<f64>,
}

impl RegionRow {
    /// Build a row, deriving area and centroid from the outline.
    pub fn new(code: impl Into<String>, name: impl Into<String>, geometry: RegionGeometry) -> Self {
        let centroid = geometry.centroid();
        Self {
            code: code.into(),
            name: name.into(),
            area: geometry.area(),
            latitude: centroid.map(|(_, y)| y),
            longitude: centroid.map(|(x, _)| x),
            geometry,
        }
    }

    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            code: self.code.clone(),
            name: self.name.clone(),
            area: self.area,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Scalar attributes of a region, without its outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub code: String,
    pub name: String,
    pub area: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Ordered regions with unique codes, plus result columns appended over time.
#[derive(Debug, Default)]
pub struct RegionTable {
    rows: Vec<RegionRow>,
    index: HashMap<String, usize>,
    columns: BTreeMap<ColumnKey, Arc<ResultColumn>>,
}

impl RegionTable {
    /// Build a table, rejecting duplicate region codes.
    pub fn new(rows: Vec<RegionRow>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.code.clone(), i).is_some() {
                return Err(RegionStatsError::DuplicateRegion(row.code.clone()));
            }
        }
        Ok(Self {
            rows,
            index,
            columns: BTreeMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RegionRow] {
        &self.rows
    }

    pub fn get(&self, code: &str) -> Option<&RegionRow> {
        self.index.get(code).map(|&i| &self.rows[i])
    }

    /// Look up a row, treating an unknown code as a fault.
    pub fn row(&self, code: &str) -> Result<&RegionRow> {
        self.get(code)
            .ok_or_else(|| RegionStatsError::UnknownRegion(code.to_string()))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.code.as_str())
    }

    pub fn column(&self, key: &ColumnKey) -> Option<Arc<ResultColumn>> {
        self.columns.get(key).cloned()
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.keys()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Append a column. An existing column under `key` is never replaced;
    /// the stored column is returned either way.
    pub fn insert_column(&mut self, key: ColumnKey, column: ResultColumn) -> Arc<ResultColumn> {
        self.columns
            .entry(key)
            .or_insert_with(|| Arc::new(column))
            .clone()
    }
}
