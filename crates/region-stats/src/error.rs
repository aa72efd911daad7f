//! Error types for region statistics.

use std::path::{Path, PathBuf};

use shape_cutter::ShapeCutError;
use thiserror::Error;

/// Faults raised while loading data or answering mean queries.
///
/// A region without grid coverage is not a fault; its mean is `None`.
#[derive(Error, Debug)]
pub enum RegionStatsError {
    #[error("unknown region code '{0}'")]
    UnknownRegion(String),

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("duplicate region code '{0}'")]
    DuplicateRegion(String),

    #[error("invalid column key '{0}': expected '<scenario>,<year>'")]
    InvalidColumnKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A data file could not be read or decoded.
    #[error("failed to load {path}: {reason}")]
    Source { path: PathBuf, reason: String },

    #[error(transparent)]
    Cut(#[from] ShapeCutError),
}

impl RegionStatsError {
    /// Create a Source error for `path`.
    pub fn source(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Source {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for region statistics operations.
pub type Result<T> = std::result::Result<T, RegionStatsError>;
