//! Error types for shape cutting.

use thiserror::Error;

use crate::coord::Axis;

/// Faults raised by malformed fields, coordinates or geometries.
///
/// A region that simply has no grid coverage is not an error; that outcome
/// is reported as [`crate::CutOutcome::NoCoverage`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeCutError {
    /// The field has no dimension coordinate for a horizontal axis.
    #[error("field has no {0} dimension coordinate")]
    MissingHorizontalCoord(Axis),

    /// More than one dimension claims the same horizontal or time axis.
    #[error("field has more than one {0} dimension coordinate")]
    DuplicateAxis(Axis),

    /// Data shape does not agree with the declared coordinates.
    #[error("data shape {data:?} does not match coordinate lengths {coords:?}")]
    ShapeMismatch {
        data: Vec<usize>,
        coords: Vec<usize>,
    },

    /// A coordinate is not strictly monotonic, or its bounds are malformed.
    #[error("invalid coordinate '{name}': {reason}")]
    InvalidCoordinate { name: String, reason: String },

    /// Bounds were requested for a coordinate with fewer than two points.
    #[error("cannot guess bounds for coordinate '{0}' with fewer than two points")]
    CannotGuessBounds(String),

    /// The geometry has no vertices and therefore no bounding rectangle.
    #[error("geometry is empty and has no bounding rectangle")]
    EmptyGeometry,

    /// WKT text could not be parsed into a polygon.
    #[error("invalid WKT: {0}")]
    InvalidWkt(String),

    /// The CF time units string could not be understood.
    #[error("invalid time units '{0}'")]
    InvalidTimeUnits(String),

    /// A time operation was requested on a field without a time axis.
    #[error("field '{0}' has no time coordinate")]
    NoTimeCoordinate(String),

    /// No time step of the field falls in the requested year.
    #[error("no time step of field '{field}' falls in year {year}")]
    YearNotAvailable { field: String, year: i32 },
}

impl ShapeCutError {
    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidWkt error.
    pub fn invalid_wkt(msg: impl Into<String>) -> Self {
        Self::InvalidWkt(msg.into())
    }

    /// Create a YearNotAvailable error.
    pub fn year_not_available(field: impl Into<String>, year: i32) -> Self {
        Self::YearNotAvailable {
            field: field.into(),
            year,
        }
    }
}

/// Result type for shape cutting operations.
pub type Result<T> = std::result::Result<T, ShapeCutError>;
