//! Dimension coordinates of a gridded field.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeCutError};

/// The role a dimension coordinate plays in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal X (longitude for geographic grids).
    X,
    /// Horizontal Y (latitude for geographic grids).
    Y,
    /// Time, interpreted through the field's time units.
    #[serde(alias = "t")]
    Time,
    /// Any other dimension (ensemble member, height, ...).
    Other,
}

impl Axis {
    /// Parse from string (case-insensitive). Unknown names map to `Other`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "x" | "lon" | "longitude" => Self::X,
            "y" | "lat" | "latitude" => Self::Y,
            "t" | "time" => Self::Time,
            _ => Self::Other,
        }
    }

    /// Whether this is one of the two horizontal axes.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::X | Self::Y)
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Time => write!(f, "time"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A monotonic coordinate attached to exactly one array dimension.
///
/// Bounds, when present, hold the two edges of each cell in the same
/// direction as the points (so a descending coordinate has descending edges).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCoord {
    pub name: String,
    pub axis: Axis,
    pub points: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Vec<[f64; 2]>>,
}

impl DimCoord {
    /// Create a coordinate without bounds, validating monotonicity.
    pub fn new(name: impl Into<String>, axis: Axis, points: Vec<f64>) -> Result<Self> {
        let coord = Self {
            name: name.into(),
            axis,
            points,
            bounds: None,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Attach explicit cell bounds.
    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> Result<Self> {
        self.bounds = Some(bounds);
        self.validate()?;
        Ok(self)
    }

    /// Check points are finite and strictly monotonic, and bounds line up.
    pub fn validate(&self) -> Result<()> {
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(ShapeCutError::invalid_coordinate(
                &self.name,
                "points must be finite",
            ));
        }

        if self.points.len() > 1 {
            let ascending = self.points.windows(2).all(|w| w[1] > w[0]);
            let descending = self.points.windows(2).all(|w| w[1] < w[0]);
            if !ascending && !descending {
                return Err(ShapeCutError::invalid_coordinate(
                    &self.name,
                    "points must be strictly monotonic",
                ));
            }
        }

        if let Some(bounds) = &self.bounds {
            if bounds.len() != self.points.len() {
                return Err(ShapeCutError::invalid_coordinate(
                    &self.name,
                    format!(
                        "{} bounds for {} points",
                        bounds.len(),
                        self.points.len()
                    ),
                ));
            }
            if bounds.iter().flatten().any(|b| !b.is_finite()) {
                return Err(ShapeCutError::invalid_coordinate(
                    &self.name,
                    "bounds must be finite",
                ));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    /// Largest point value, if any.
    pub fn max_point(&self) -> Option<f64> {
        self.points.iter().copied().reduce(f64::max)
    }

    /// Smallest point value, if any.
    pub fn min_point(&self) -> Option<f64> {
        self.points.iter().copied().reduce(f64::min)
    }

    /// Derive bounds from the points when none are present.
    ///
    /// Each inner edge is the midpoint between neighbouring points; the two
    /// outer edges are extrapolated by half the adjacent spacing.
    pub fn guess_bounds(&mut self) -> Result<()> {
        if self.bounds.is_some() {
            return Ok(());
        }
        if self.points.len() < 2 {
            return Err(ShapeCutError::CannotGuessBounds(self.name.clone()));
        }

        let n = self.points.len();
        let mut diffs = Vec::with_capacity(n + 1);
        diffs.push(self.points[1] - self.points[0]);
        diffs.extend(self.points.windows(2).map(|w| w[1] - w[0]));
        diffs.push(self.points[n - 1] - self.points[n - 2]);

        let bounds = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| [p - diffs[i] * 0.5, p + diffs[i + 1] * 0.5])
            .collect();

        self.bounds = Some(bounds);
        Ok(())
    }

    /// Extent of cell `i` as `(low, high)`.
    ///
    /// Without bounds a cell collapses onto its point.
    pub fn cell_extent(&self, i: usize) -> (f64, f64) {
        match &self.bounds {
            Some(bounds) => {
                let [a, b] = bounds[i];
                (a.min(b), a.max(b))
            }
            None => (self.points[i], self.points[i]),
        }
    }

    /// Indices of cells whose extent meets the closed interval `[lo, hi]`.
    pub fn indices_within(&self, lo: f64, hi: f64) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| {
                let (cell_lo, cell_hi) = self.cell_extent(i);
                cell_hi >= lo && cell_lo <= hi
            })
            .collect()
    }

    /// A new coordinate holding only the given indices, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            axis: self.axis,
            points: indices.iter().map(|&i| self.points[i]).collect(),
            bounds: self
                .bounds
                .as_ref()
                .map(|b| indices.iter().map(|&i| b[i]).collect()),
        }
    }
}
