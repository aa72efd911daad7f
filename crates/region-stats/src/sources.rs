//! Where gridded fields and region tables come from.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use shape_cutter::{DimCoord, GriddedField, RegionGeometry, ShapeCutError, TimeUnits};
use tracing::{debug, info};

use crate::error::{RegionStatsError, Result};
use crate::table::RegionRow;

/// Supplies one gridded field per scenario.
pub trait FieldSource: Send + Sync {
    /// Scenario names this source can load.
    fn scenarios(&self) -> Vec<String>;

    /// Load the field for `scenario`.
    fn load_field(&self, scenario: &str) -> Result<GriddedField>;
}

/// Supplies the table of regions.
pub trait RegionSource: Send + Sync {
    fn load_regions(&self) -> Result<Vec<RegionRow>>;
}

// ============================================================================
// JSON field documents
// ============================================================================

/// On-disk layout of one field.
///
/// `data` is flattened in row-major order over `dims`; `null` entries are
/// read as missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(default)]
    pub units: String,
    pub dims: Vec<DimCoord>,
    #[serde(default)]
    pub time_units: Option<String>,
    #[serde(default)]
    pub missing_value: Option<f32>,
    pub data: Vec<Option<f32>>,
}

impl FieldDocument {
    pub fn into_field(self) -> Result<GriddedField> {
        let shape: Vec<usize> = self.dims.iter().map(DimCoord::len).collect();
        let values: Vec<f32> = self
            .data
            .into_iter()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect();

        let n = values.len();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            ShapeCutError::ShapeMismatch {
                data: vec![n],
                coords: shape.clone(),
            }
        })?;

        let mut field = GriddedField::new(self.name, data, self.dims)?
            .with_units(self.units)
            .with_missing_value(self.missing_value);
        if let Some(units) = self.time_units {
            field = field.with_time_units(TimeUnits::parse(&units)?);
        }
        Ok(field)
    }
}

/// Reads each scenario's field from a JSON [`FieldDocument`].
#[derive(Debug, Clone, Default)]
pub struct FileFieldSource {
    paths: BTreeMap<String, PathBuf>,
}

impl FileFieldSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the document for a scenario. Names are case-insensitive.
    pub fn with_scenario(mut self, scenario: &str, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(scenario.to_lowercase(), path.into());
        self
    }
}

impl FromIterator<(String, PathBuf)> for FileFieldSource {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |source, (name, path)| source.with_scenario(&name, path))
    }
}

impl FieldSource for FileFieldSource {
    fn scenarios(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }

    fn load_field(&self, scenario: &str) -> Result<GriddedField> {
        let path = self
            .paths
            .get(&scenario.to_lowercase())
            .ok_or_else(|| RegionStatsError::UnknownScenario(scenario.to_string()))?;

        let text = read(path)?;
        let doc: FieldDocument =
            serde_json::from_str(&text).map_err(|e| RegionStatsError::source(path, e))?;
        let field = doc.into_field()?;
        let years = field.years()?;

        info!(
            scenario = %scenario,
            path = %path.display(),
            shape = ?field.shape(),
            years = years.len(),
            "Loaded field"
        );
        Ok(field)
    }
}

// ============================================================================
// YAML region lists
// ============================================================================

/// One region as listed in a regions file, geometry in WKT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRecord {
    pub code: String,
    pub name: String,
    pub geometry: String,
}

impl RegionRecord {
    pub fn into_row(self) -> Result<RegionRow> {
        let geometry = RegionGeometry::from_wkt(&self.geometry)?;
        Ok(RegionRow::new(self.code, self.name, geometry))
    }
}

/// Reads the region table from a YAML list of [`RegionRecord`]s.
#[derive(Debug, Clone)]
pub struct FileRegionSource {
    path: PathBuf,
}

impl FileRegionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegionSource for FileRegionSource {
    fn load_regions(&self) -> Result<Vec<RegionRow>> {
        let text = read(&self.path)?;
        let records: Vec<RegionRecord> =
            serde_yaml::from_str(&text).map_err(|e| RegionStatsError::source(&self.path, e))?;

        let rows = records
            .into_iter()
            .map(|record| {
                let code = record.code.clone();
                record.into_row().map_err(|e| {
                    RegionStatsError::source(&self.path, format!("region '{code}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(path = %self.path.display(), regions = rows.len(), "Loaded regions");
        Ok(rows)
    }
}

fn read(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Reading");
    fs::read_to_string(path).map_err(|e| RegionStatsError::source(path, e))
}
