//! Longitude-domain reconciliation between a field and a region outline.
//!
//! Longitude is written either on [-180, 180) or on [0, 360). A field and a
//! geometry must agree before any spatial comparison, so the field's X axis
//! is re-wrapped onto the geometry's convention when they differ. This is a
//! re-indexing of the X dimension, not a reprojection.

use std::borrow::Cow;

use tracing::debug;

use crate::bbox::BoundingBox;
use crate::field::GriddedField;

/// Full turn in degrees.
const FULL_TURN: f64 = 360.0;

/// The two supported longitude conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LonDomain {
    /// [-180, 180): the prime meridian at the centre.
    PrimeMeridianCentred,
    /// [0, 360): the dateline at the centre.
    DatelineCentred,
}

impl LonDomain {
    /// Classify from the largest X value present.
    pub fn from_max_x(max_x: f64) -> Self {
        if dateline_centred(max_x) {
            Self::DatelineCentred
        } else {
            Self::PrimeMeridianCentred
        }
    }

    /// Convention of a bounding box, from its maximum X.
    pub fn of_bbox(bbox: &BoundingBox) -> Self {
        if bbox.dateline_centred() {
            Self::DatelineCentred
        } else {
            Self::PrimeMeridianCentred
        }
    }

    /// Lower edge of the half-open domain.
    pub fn lower(&self) -> f64 {
        match self {
            Self::PrimeMeridianCentred => -180.0,
            Self::DatelineCentred => 0.0,
        }
    }

    /// Map a longitude into `[lower, lower + 360)`.
    pub fn wrap(&self, x: f64) -> f64 {
        x - self.shift_for(x)
    }

    /// Multiple of 360 subtracted from `x` by [`LonDomain::wrap`].
    fn shift_for(&self, x: f64) -> f64 {
        ((x - self.lower()) / FULL_TURN).floor() * FULL_TURN
    }
}

/// Whether a maximum X value implies the [0, 360) convention.
///
/// Values of exactly 180 classify as [-180, 180).
pub fn dateline_centred(max_x: f64) -> bool {
    max_x > 180.0
}

/// Domain convention of the field's X coordinate, if it has any points.
pub fn field_domain(field: &GriddedField) -> Option<LonDomain> {
    field.x_coord().max_point().map(LonDomain::from_max_x)
}

/// Re-express the field's X axis on the geometry's longitude convention.
///
/// Borrows the field unchanged when both already agree (or the field has no
/// X points). Antimeridian-crossing outlines are not detected; only the
/// maximum X of each side is consulted.
pub fn reconcile<'a>(field: &'a GriddedField, target: &BoundingBox) -> Cow<'a, GriddedField> {
    let wanted = LonDomain::of_bbox(target);
    match field_domain(field) {
        Some(current) if current != wanted => {
            debug!(
                field = %field.name(),
                from = ?current,
                to = ?wanted,
                "Re-wrapping field longitude domain"
            );
            Cow::Owned(rewrap(field, wanted))
        }
        _ => Cow::Borrowed(field),
    }
}

/// Move every X point into `domain`, shifting bounds with it, and sort the
/// X axis ascending.
pub fn rewrap(field: &GriddedField, domain: LonDomain) -> GriddedField {
    let x_dim = field.x_dim();
    let x = field.x_coord();

    let shifts: Vec<f64> = x.points.iter().map(|&p| domain.shift_for(p)).collect();
    let wrapped: Vec<f64> = x
        .points
        .iter()
        .zip(&shifts)
        .map(|(p, s)| p - s)
        .collect();

    let mut order: Vec<usize> = (0..wrapped.len()).collect();
    order.sort_by(|&a, &b| wrapped[a].total_cmp(&wrapped[b]));

    let mut coord = x.select(&order);
    coord.points = order.iter().map(|&i| wrapped[i]).collect();
    if let Some(bounds) = coord.bounds.as_mut() {
        for (bound, &i) in bounds.iter_mut().zip(&order) {
            bound[0] -= shifts[i];
            bound[1] -= shifts[i];
        }
    }

    field.select_indices(x_dim, &order).replace_coord(x_dim, coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Axis, DimCoord};
    use ndarray::Array;

    fn global_field(x_points: Vec<f64>) -> GriddedField {
        let nx = x_points.len();
        let data = Array::from_shape_fn((2, nx), |(_, i)| i as f32).into_dyn();
        GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("latitude", Axis::Y, vec![0.0, 10.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, x_points).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_domain_classification() {
        assert_eq!(LonDomain::from_max_x(359.0), LonDomain::DatelineCentred);
        assert_eq!(LonDomain::from_max_x(180.0), LonDomain::PrimeMeridianCentred);
        assert_eq!(LonDomain::from_max_x(-70.0), LonDomain::PrimeMeridianCentred);
    }

    #[test]
    fn test_wrap() {
        let pm = LonDomain::PrimeMeridianCentred;
        assert_eq!(pm.wrap(270.0), -90.0);
        assert_eq!(pm.wrap(180.0), -180.0);
        assert_eq!(pm.wrap(10.0), 10.0);

        let dl = LonDomain::DatelineCentred;
        assert_eq!(dl.wrap(-90.0), 270.0);
        assert_eq!(dl.wrap(0.0), 0.0);
        assert_eq!(dl.wrap(360.0), 0.0);
    }

    #[test]
    fn test_rewrap_to_prime_meridian() {
        let field = global_field(vec![0.0, 90.0, 180.0, 270.0]);
        let out = rewrap(&field, LonDomain::PrimeMeridianCentred);

        assert_eq!(out.x_coord().points, vec![-180.0, -90.0, 0.0, 90.0]);
        let row: Vec<f32> = out.data().iter().take(4).copied().collect();
        assert_eq!(row, vec![2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rewrap_shifts_bounds_with_points() {
        let field = global_field(vec![0.0, 90.0, 180.0, 270.0])
            .with_guessed_bounds()
            .unwrap();
        let out = rewrap(&field, LonDomain::PrimeMeridianCentred);
        let bounds = out.x_coord().bounds.clone().unwrap();
        assert_eq!(bounds[0], [-225.0, -135.0]);
        assert_eq!(bounds[1], [-135.0, -45.0]);
        assert_eq!(bounds[2], [-45.0, 45.0]);
    }

    #[test]
    fn test_reconcile_leaves_matching_domains_alone() {
        let field = global_field(vec![0.0, 90.0, 180.0, 270.0]);
        let bbox = BoundingBox::new(250.0, 30.0, 260.0, 40.0);
        let out = reconcile(&field, &bbox);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(*out, field);
    }

    #[test]
    fn test_reconcile_switches_domain() {
        let field = global_field(vec![-180.0, -90.0, 0.0, 90.0]);
        let bbox = BoundingBox::new(250.0, 30.0, 260.0, 40.0);
        let out = reconcile(&field, &bbox);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.x_coord().points, vec![0.0, 90.0, 180.0, 270.0]);
    }
}
