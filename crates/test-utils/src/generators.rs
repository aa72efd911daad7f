//! Test data generators for creating synthetic climate fields and outlines.
//!
//! These generators create predictable, verifiable data patterns that can be
//! used across the test suite.

use ndarray::{Array, Array2, IxDyn};
use shape_cutter::{Axis, DimCoord, GriddedField, TimeUnits};

use crate::fixtures::{time, GridSpec};

/// Day offset of 2 July of `year` from the fixture epoch (1860-01-01).
///
/// Years before 1860 are clamped to the epoch year.
pub fn mid_year_offset(year: i32) -> f64 {
    let days: i64 = (1860..year.max(1860))
        .map(|y| if is_leap(y) { 366 } else { 365 })
        .sum();
    (days + 182) as f64
}

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Builds a field on `spec` with one time step per entry of `years`.
///
/// `value(t, row, col)` gives each element; rows run along latitude and
/// columns along longitude. With no years the field is purely horizontal.
///
/// # Example
///
/// ```
/// use test_utils::{regular_field, grid};
///
/// let field = regular_field(&grid::GLOBAL_10DEG, &[2050], |_, row, col| (row * 100 + col) as f32);
/// assert_eq!(field.shape(), &[1, 18, 36]);
/// assert_eq!(field.data()[[0, 1, 2]], 102.0);
/// ```
pub fn regular_field<F>(spec: &GridSpec, years: &[i32], value: F) -> GriddedField
where
    F: Fn(usize, usize, usize) -> f32,
{
    let lat = DimCoord::new("latitude", Axis::Y, spec.y_points()).expect("monotonic latitude");
    let lon = DimCoord::new("longitude", Axis::X, spec.x_points()).expect("monotonic longitude");

    if years.is_empty() {
        let data = Array2::from_shape_fn((spec.height, spec.width), |(j, i)| value(0, j, i));
        return GriddedField::new("air_temperature", data.into_dyn(), vec![lat, lon])
            .expect("consistent field")
            .with_units("K");
    }

    let times: Vec<f64> = years.iter().map(|&y| mid_year_offset(y)).collect();
    let time = DimCoord::new("time", Axis::Time, times).expect("monotonic time");
    let data = Array::from_shape_fn((years.len(), spec.height, spec.width), |(t, j, i)| {
        value(t, j, i)
    });

    GriddedField::new("air_temperature", data.into_dyn(), vec![time, lat, lon])
        .expect("consistent field")
        .with_units("K")
        .with_time_units(TimeUnits::parse(time::UNITS).expect("valid time units"))
}

/// Field whose element value encodes its own position: `t * 10000 + row * 100 + col`.
///
/// This makes it easy to check which cells survived a cut.
pub fn index_field(spec: &GridSpec, years: &[i32]) -> GriddedField {
    regular_field(spec, years, |t, row, col| (t * 10000 + row * 100 + col) as f32)
}

/// Creates a field with temperature-like values in Kelvin.
///
/// Values run from about 250K at the south-west corner to 310K at the
/// north-east corner, with `warming` Kelvin added per time step.
pub fn temperature_field(spec: &GridSpec, years: &[i32], warming: f32) -> GriddedField {
    let (w, h) = (spec.width.max(1) as f32, spec.height.max(1) as f32);
    regular_field(spec, years, |t, row, col| {
        250.0 + (col as f32 / w) * 30.0 + (row as f32 / h) * 30.0 + warming * t as f32
    })
}

/// A single-time-step field from explicit coordinates and rows of values.
///
/// `rows[j][i]` sits at `(x_points[i], y_points[j])`.
pub fn small_field(x_points: &[f64], y_points: &[f64], rows: &[&[f32]], year: i32) -> GriddedField {
    let data = Array::from_shape_fn(IxDyn(&[1, y_points.len(), x_points.len()]), |idx| {
        rows[idx[1]][idx[2]]
    });
    let dims = vec![
        DimCoord::new("time", Axis::Time, vec![mid_year_offset(year)]).expect("time"),
        DimCoord::new("latitude", Axis::Y, y_points.to_vec()).expect("monotonic latitude"),
        DimCoord::new("longitude", Axis::X, x_points.to_vec()).expect("monotonic longitude"),
    ];
    GriddedField::new("air_temperature", data, dims)
        .expect("consistent field")
        .with_time_units(TimeUnits::parse(time::UNITS).expect("valid time units"))
}

/// WKT for the axis-aligned rectangle `(min_x, min_y)..(max_x, max_y)`.
pub fn rectangle_wkt(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> String {
    format!(
        "POLYGON(({min_x} {min_y}, {max_x} {min_y}, {max_x} {max_y}, {min_x} {max_y}, {min_x} {min_y}))"
    )
}

/// WKT for a square strictly inside cell `(col, row)` of `spec`.
///
/// `inset` is the fraction of the cell width kept clear on every side.
pub fn cell_interior_wkt(spec: &GridSpec, col: usize, row: usize, inset: f64) -> String {
    let cx = spec.min_x + col as f64 * spec.dx;
    let cy = spec.min_y + row as f64 * spec.dy;
    let hx = spec.dx * (0.5 - inset);
    let hy = spec.dy * (0.5 - inset);
    rectangle_wkt(cx - hx, cy - hy, cx + hx, cy + hy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid;

    #[test]
    fn test_mid_year_offset_lands_in_year() {
        let units = TimeUnits::parse(time::UNITS).unwrap();
        for year in [1860, 1900, 2000, 2050, 2100] {
            assert_eq!(units.year_of(mid_year_offset(year)).unwrap(), year);
        }
    }

    #[test]
    fn test_index_field_values() {
        let field = index_field(&grid::WEST_US_2DEG, &[2000, 2050]);
        assert_eq!(field.shape(), &[2, 10, 15]);
        assert_eq!(field.data()[[1, 3, 4]], 10304.0);
        assert_eq!(field.years().unwrap(), vec![2000, 2050]);
    }

    #[test]
    fn test_temperature_field_range() {
        let field = temperature_field(&grid::GLOBAL_10DEG, &[], 0.0);
        assert_eq!(field.shape(), &[18, 36]);
        assert!(field.data().iter().all(|&v| (250.0..=310.0).contains(&v)));
    }

    #[test]
    fn test_rectangle_wkt() {
        assert_eq!(
            rectangle_wkt(1.0, 2.0, 3.5, 4.0),
            "POLYGON((1 2, 3.5 2, 3.5 4, 1 4, 1 2))"
        );
    }
}
