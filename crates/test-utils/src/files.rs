//! Temp-file writers for field documents, region lists and dataset configs.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use shape_cutter::GriddedField;
use tempfile::TempDir;

use crate::fixtures::{grid, sample_regions, scenarios, time, RegionFixture};
use crate::generators::temperature_field;

/// Serialize a field into the JSON document layout read by file sources.
pub fn field_document(field: &GriddedField) -> serde_json::Value {
    let data: Vec<Option<f32>> = field
        .data()
        .iter()
        .map(|&v| v.is_finite().then_some(v))
        .collect();

    json!({
        "name": field.name(),
        "units": field.units(),
        "dims": field.dims(),
        "time_units": field.time_units().map(|u| u.to_string()),
        "missing_value": field.missing_value(),
        "data": data,
    })
}

/// Write `field` as `<dir>/<file_name>` and return the path.
pub fn write_field_json(dir: &Path, file_name: &str, field: &GriddedField) -> PathBuf {
    let path = dir.join(file_name);
    let text = serde_json::to_string_pretty(&field_document(field)).expect("serialize field");
    fs::write(&path, text).expect("write field document");
    path
}

/// Write a YAML region list as `<dir>/<file_name>` and return the path.
pub fn write_regions_yaml(dir: &Path, file_name: &str, regions: &[RegionFixture]) -> PathBuf {
    let path = dir.join(file_name);
    let text = serde_yaml::to_string(regions).expect("serialize regions");
    fs::write(&path, text).expect("write regions");
    path
}

/// Write a dataset config referencing files relative to `dir`.
pub fn write_dataset_config(
    dir: &Path,
    scenarios: &[(&str, &str)],
    regions_file: &str,
    workers: usize,
) -> PathBuf {
    let mut text = String::from("scenarios:\n");
    for (name, file) in scenarios {
        text.push_str(&format!("  {name}: {file}\n"));
    }
    text.push_str(&format!("regions: {regions_file}\n"));
    text.push_str(&format!("stats:\n  workers: {workers}\n  diagnostics: warn\n"));

    let path = dir.join("dataset.yaml");
    fs::write(&path, text).expect("write dataset config");
    path
}

/// A complete on-disk dataset in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TestDataset {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl TestDataset {
    /// Two scenarios on the global 10 degree grid plus the sample regions.
    ///
    /// The `e1` scenario warms half as fast as `a1b`.
    pub fn standard() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let spec = grid::GLOBAL_10DEG;

        write_field_json(
            dir.path(),
            "a1b.json",
            &temperature_field(&spec, &time::YEARS, 2.0),
        );
        write_field_json(
            dir.path(),
            "e1.json",
            &temperature_field(&spec, &time::YEARS, 1.0),
        );
        write_regions_yaml(dir.path(), "regions.yaml", &sample_regions());

        let config_path = write_dataset_config(
            dir.path(),
            &[(scenarios::A1B, "a1b.json"), (scenarios::E1, "e1.json")],
            "regions.yaml",
            2,
        );

        Self { dir, config_path }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
