//! Clip-then-mask orchestration.

use std::borrow::Cow;

use ndarray::{ArrayD, Dimension, IxDyn, Zip};
use tracing::debug;

use crate::clip::clip_to_bbox;
use crate::error::{Result, ShapeCutError};
use crate::field::GriddedField;
use crate::geometry::RegionGeometry;
use crate::mask::{boundary_mask, Mask};
use crate::reconcile::reconcile;

/// Why a region produced no masked data. None of these are faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCoverage {
    /// The bounding-box cut left no cells.
    EmptySelection,
    /// Cell bounds could not be inferred for the remaining cells.
    BoundsUnavailable,
    /// Cells were selected but none of them touches the outline.
    OutsideBoundary,
}

impl std::fmt::Display for NoCoverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySelection => write!(f, "no grid cells in bounding box"),
            Self::BoundsUnavailable => write!(f, "cell bounds unavailable"),
            Self::OutsideBoundary => write!(f, "no grid cell touches the boundary"),
        }
    }
}

/// Result of cutting a field to a region.
#[derive(Debug, Clone)]
pub enum CutOutcome {
    Masked(MaskedField),
    NoCoverage(NoCoverage),
}

impl CutOutcome {
    pub fn masked(self) -> Option<MaskedField> {
        match self {
            Self::Masked(m) => Some(m),
            Self::NoCoverage(_) => None,
        }
    }

    pub fn is_covered(&self) -> bool {
        matches!(self, Self::Masked(_))
    }
}

/// A clipped field whose cells outside the region are flagged missing.
///
/// The data array keeps its full shape; `valid` has the same shape and is
/// `false` wherever the 2D mask excluded a cell.
#[derive(Debug, Clone)]
pub struct MaskedField {
    field: GriddedField,
    mask: Mask,
    valid: ArrayD<bool>,
}

impl MaskedField {
    pub fn field(&self) -> &GriddedField {
        &self.field
    }

    /// The 2D horizontal mask, rows along Y.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Full-shape validity array.
    pub fn valid(&self) -> &ArrayD<bool> {
        &self.valid
    }

    /// Number of horizontal cells inside the region.
    pub fn cells_inside(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Data with excluded and missing elements replaced by `None`.
    pub fn masked_data(&self) -> ArrayD<Option<f32>> {
        let field = &self.field;
        Zip::from(field.data())
            .and(&self.valid)
            .map_collect(|&v, &keep| (keep && field.is_valid_value(v)).then_some(v))
    }

    /// Arithmetic mean over every unmasked, non-missing element.
    pub fn mean(&self) -> Option<f64> {
        let mut sum = 0.0_f64;
        let mut count = 0usize;
        Zip::from(self.field.data())
            .and(&self.valid)
            .for_each(|&v, &keep| {
                if keep && self.field.is_valid_value(v) {
                    sum += v as f64;
                    count += 1;
                }
            });
        (count > 0).then(|| sum / count as f64)
    }

    /// Mean over the two horizontal dimensions, one value per remaining index.
    ///
    /// The result drops the X and Y dimensions; an index whose horizontal
    /// slice has no valid element is `None`.
    pub fn collapse_horizontal_mean(&self) -> ArrayD<Option<f64>> {
        let (x_dim, y_dim) = (self.field.x_dim(), self.field.y_dim());
        let rest_shape: Vec<usize> = self
            .field
            .shape()
            .iter()
            .enumerate()
            .filter(|(d, _)| *d != x_dim && *d != y_dim)
            .map(|(_, &n)| n)
            .collect();

        let mut sums = ArrayD::<f64>::zeros(IxDyn(&rest_shape));
        let mut counts = ArrayD::<usize>::zeros(IxDyn(&rest_shape));
        let mut rest_idx = Vec::with_capacity(rest_shape.len());

        for (idx, &v) in self.field.data().indexed_iter() {
            if !self.valid[&idx] || !self.field.is_valid_value(v) {
                continue;
            }
            rest_idx.clear();
            rest_idx.extend(
                idx.slice()
                    .iter()
                    .enumerate()
                    .filter(|(d, _)| *d != x_dim && *d != y_dim)
                    .map(|(_, &i)| i),
            );
            sums[rest_idx.as_slice()] += v as f64;
            counts[rest_idx.as_slice()] += 1;
        }

        Zip::from(&sums)
            .and(&counts)
            .map_collect(|&s, &n| (n > 0).then(|| s / n as f64))
    }
}

/// Cuts gridded fields to region outlines in two stages: a bounding-box
/// pre-filter followed by a per-cell boundary mask.
#[derive(Debug, Clone, Copy)]
pub struct ShapeCutter {
    bbox_prefilter: bool,
}

impl Default for ShapeCutter {
    fn default() -> Self {
        Self {
            bbox_prefilter: true,
        }
    }
}

impl ShapeCutter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask the whole field without the bounding-box cut. Slower, same cells.
    pub fn without_prefilter() -> Self {
        Self {
            bbox_prefilter: false,
        }
    }

    /// Cut `field` to `geometry`.
    ///
    /// An empty geometry is a fault. Lack of grid coverage is reported as
    /// [`CutOutcome::NoCoverage`].
    pub fn cut(&self, field: &GriddedField, geometry: &RegionGeometry) -> Result<CutOutcome> {
        let bbox = geometry.bounding_box()?;

        // Bounds are inferred on the full grid so that a one-cell cut keeps
        // real cell edges. Callers cutting many regions should infer them
        // once up front; the field is then borrowed, not copied.
        let bounded = if field.has_horizontal_bounds() {
            Cow::Borrowed(field)
        } else {
            let mut owned = field.clone();
            owned.guess_horizontal_bounds()?;
            Cow::Owned(owned)
        };
        if !bounded.x_coord().has_bounds() || !bounded.y_coord().has_bounds() {
            debug!(field = %field.name(), "Keeping single-point coordinate without bounds");
        }

        let reconciled = reconcile(&bounded, &bbox);
        let sub = if self.bbox_prefilter {
            clip_to_bbox(&reconciled, &bbox)
        } else {
            reconciled.into_owned()
        };

        let Some(slice) = sub.horizontal_slice() else {
            return Ok(CutOutcome::NoCoverage(NoCoverage::EmptySelection));
        };

        let mask = match boundary_mask(&slice, geometry) {
            Ok(mask) => mask,
            Err(ShapeCutError::CannotGuessBounds(_)) => {
                return Ok(CutOutcome::NoCoverage(NoCoverage::BoundsUnavailable));
            }
            Err(e) => return Err(e),
        };

        if !mask.iter().any(|&m| m) {
            return Ok(CutOutcome::NoCoverage(NoCoverage::OutsideBoundary));
        }

        let (x_dim, y_dim) = (sub.x_dim(), sub.y_dim());
        let valid = ArrayD::from_shape_fn(IxDyn(sub.shape()), |idx| mask[[idx[y_dim], idx[x_dim]]]);

        debug!(
            field = %sub.name(),
            shape = ?sub.shape(),
            cells_inside = mask.iter().filter(|&&m| m).count(),
            "Cut field to region"
        );

        Ok(CutOutcome::Masked(MaskedField {
            field: sub,
            mask,
            valid,
        }))
    }
}
