//! Configuration for region statistics.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for a [`crate::RegionMeanCache`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionStatsConfig {
    /// Worker threads for column batches. 0 uses the shared rayon pool,
    /// 1 runs regions one after another.
    pub workers: usize,

    /// How loudly per-region problems inside a batch are reported.
    pub diagnostics: DiagnosticsLevel,
}

impl Default for RegionStatsConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            diagnostics: DiagnosticsLevel::Warn,
        }
    }
}

impl RegionStatsConfig {
    /// Upper bound on dedicated worker threads.
    pub const MAX_WORKERS: usize = 256;

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `REGION_STATS_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("REGION_STATS_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.workers = workers;
            }
        }

        if let Ok(val) = std::env::var("REGION_STATS_DIAGNOSTICS") {
            self.diagnostics = DiagnosticsLevel::from_str(&val);
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers > Self::MAX_WORKERS {
            return Err(format!(
                "workers must be at most {}, got {}",
                Self::MAX_WORKERS,
                self.workers
            ));
        }

        Ok(())
    }
}

/// Verbosity of per-region diagnostics during a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsLevel {
    /// Record faults as no data without logging them.
    Quiet,
    /// Log per-region faults as warnings.
    #[default]
    Warn,
    /// Also log regions that simply have no grid coverage.
    Debug,
}

impl DiagnosticsLevel {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "quiet" | "off" | "none" => Self::Quiet,
            "debug" | "verbose" => Self::Debug,
            _ => Self::Warn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Warn => "warn",
            Self::Debug => "debug",
        }
    }

    /// Report a region whose mean could not be computed.
    pub fn region_fault(&self, region: &str, column: &str, error: &dyn std::fmt::Display) {
        if *self != Self::Quiet {
            warn!(region = %region, column = %column, error = %error, "Region mean failed, recording no data");
        }
    }

    /// Report a region with no grid coverage.
    pub fn region_uncovered(&self, region: &str, column: &str) {
        if *self == Self::Debug {
            debug!(region = %region, column = %column, "Region has no grid coverage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RegionStatsConfig::default();
        assert_eq!(config.workers, 0);
        assert_eq!(config.diagnostics, DiagnosticsLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_too_many_workers() {
        let config = RegionStatsConfig {
            workers: 10_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_diagnostics_from_str() {
        assert_eq!(DiagnosticsLevel::from_str("QUIET"), DiagnosticsLevel::Quiet);
        assert_eq!(DiagnosticsLevel::from_str("debug"), DiagnosticsLevel::Debug);
        assert_eq!(DiagnosticsLevel::from_str("whatever"), DiagnosticsLevel::Warn);
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let config: RegionStatsConfig = serde_yaml::from_str("diagnostics: quiet\n").unwrap();
        assert_eq!(config.workers, 0);
        assert_eq!(config.diagnostics, DiagnosticsLevel::Quiet);
    }
}
