//! Dataset configuration loader.
//!
//! Loads a YAML file naming one field document per scenario, the regions
//! file and optional statistics settings:
//!
//! ```yaml
//! scenarios:
//!   a1b: fields/a1b.json
//!   e1: ${DATA_DIR:-fields}/e1.json
//! regions: regions.yaml
//! stats:
//!   workers: 4
//!   diagnostics: warn
//! ```
//!
//! Supports environment variable substitution using ${VAR} syntax. Relative
//! paths are resolved against the directory holding the config file.

use anyhow::{Context, Result};
use region_stats::{FileFieldSource, FileRegionSource, RegionStatsConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub scenarios: BTreeMap<String, PathBuf>,
    pub regions: PathBuf,
    #[serde(default)]
    pub stats: RegionStatsConfig,
}

impl DatasetConfig {
    pub fn field_source(&self) -> FileFieldSource {
        self.scenarios
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }

    pub fn region_source(&self) -> FileRegionSource {
        FileRegionSource::new(&self.regions)
    }
}

/// Load, expand, resolve and validate a dataset config.
///
/// `REGION_STATS_*` environment variables override the `stats` block.
pub fn load_dataset_config<P: AsRef<Path>>(path: P) -> Result<DatasetConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset config: {:?}", path))?;
    let expanded = expand_env_vars(&content)?;
    let mut config: DatasetConfig = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse dataset config: {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for file in config.scenarios.values_mut() {
        *file = resolve_path(base, file);
    }
    config.regions = resolve_path(base, &config.regions);
    config.stats = config.stats.with_env_overrides();

    validate_dataset_config(&config)?;
    Ok(config)
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expand environment variables in config content
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

fn validate_dataset_config(config: &DatasetConfig) -> Result<()> {
    anyhow::ensure!(
        !config.scenarios.is_empty(),
        "At least one scenario must be configured"
    );

    for (name, file) in &config.scenarios {
        anyhow::ensure!(!name.trim().is_empty(), "Scenario names cannot be empty");
        anyhow::ensure!(
            file.is_file(),
            "Field document for scenario '{}' not found: {:?}",
            name,
            file
        );
    }

    anyhow::ensure!(
        config.regions.is_file(),
        "Regions file not found: {:?}",
        config.regions
    );

    config
        .stats
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid stats config: {}", e))
}
