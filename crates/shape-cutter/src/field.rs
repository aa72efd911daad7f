//! N-dimensional gridded field with named dimension coordinates.

use ndarray::{ArrayD, ArrayView2, ArrayViewD, Axis as NdAxis, Ix2, IxDyn};

use crate::coord::{Axis, DimCoord};
use crate::error::{Result, ShapeCutError};
use crate::time::TimeUnits;

/// A climate-model field: an array plus one coordinate per array dimension.
///
/// Exactly one dimension is the horizontal X axis and exactly one is the
/// horizontal Y axis; any others (time, ensemble member, ...) are carried
/// through every operation unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField {
    name: String,
    units: String,
    data: ArrayD<f32>,
    dims: Vec<DimCoord>,
    x_dim: usize,
    y_dim: usize,
    time_dim: Option<usize>,
    time_units: Option<TimeUnits>,
    missing_value: Option<f32>,
}

/// A single 2D horizontal slice, rows along Y and columns along X.
#[derive(Debug)]
pub struct HorizontalSlice<'a> {
    pub values: ArrayView2<'a, f32>,
    pub x: &'a DimCoord,
    pub y: &'a DimCoord,
}

impl GriddedField {
    /// Build a field, checking the data shape against the coordinates.
    pub fn new(name: impl Into<String>, data: ArrayD<f32>, dims: Vec<DimCoord>) -> Result<Self> {
        let coord_lens: Vec<usize> = dims.iter().map(DimCoord::len).collect();
        if data.shape() != coord_lens.as_slice() {
            return Err(ShapeCutError::ShapeMismatch {
                data: data.shape().to_vec(),
                coords: coord_lens,
            });
        }

        for coord in &dims {
            coord.validate()?;
        }

        let x_dim = find_axis(&dims, Axis::X)?
            .ok_or(ShapeCutError::MissingHorizontalCoord(Axis::X))?;
        let y_dim = find_axis(&dims, Axis::Y)?
            .ok_or(ShapeCutError::MissingHorizontalCoord(Axis::Y))?;
        let time_dim = find_axis(&dims, Axis::Time)?;

        Ok(Self {
            name: name.into(),
            units: String::new(),
            data,
            dims,
            x_dim,
            y_dim,
            time_dim,
            time_units: None,
            missing_value: None,
        })
    }

    /// Set the physical units label (e.g. "K").
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Set the units used to interpret the time coordinate.
    pub fn with_time_units(mut self, time_units: TimeUnits) -> Self {
        self.time_units = Some(time_units);
        self
    }

    /// Set the fill value treated as missing data.
    pub fn with_missing_value(mut self, missing_value: Option<f32>) -> Self {
        self.missing_value = missing_value;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn dims(&self) -> &[DimCoord] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn time_units(&self) -> Option<&TimeUnits> {
        self.time_units.as_ref()
    }

    pub fn missing_value(&self) -> Option<f32> {
        self.missing_value
    }

    /// Array dimension holding the X coordinate.
    pub fn x_dim(&self) -> usize {
        self.x_dim
    }

    /// Array dimension holding the Y coordinate.
    pub fn y_dim(&self) -> usize {
        self.y_dim
    }

    pub fn time_dim(&self) -> Option<usize> {
        self.time_dim
    }

    pub fn x_coord(&self) -> &DimCoord {
        &self.dims[self.x_dim]
    }

    pub fn y_coord(&self) -> &DimCoord {
        &self.dims[self.y_dim]
    }

    /// Whether any dimension has zero length.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a value counts as real data.
    pub fn is_valid_value(&self, value: f32) -> bool {
        value.is_finite() && self.missing_value != Some(value)
    }

    /// Keep only `indices` (in that order) along dimension `dim`.
    pub fn select_indices(&self, dim: usize, indices: &[usize]) -> Self {
        let mut dims = self.dims.clone();
        dims[dim] = self.dims[dim].select(indices);

        Self {
            data: take_along(&self.data, dim, indices),
            dims,
            ..self.clone_metadata()
        }
    }

    /// Replace the coordinate of one dimension, keeping the data as-is.
    ///
    /// The new coordinate must have the same length as the old one.
    pub(crate) fn replace_coord(mut self, dim: usize, coord: DimCoord) -> Self {
        debug_assert_eq!(self.dims[dim].len(), coord.len());
        self.dims[dim] = coord;
        self
    }

    /// Infer bounds on the coordinate of one dimension.
    pub fn guess_bounds(&mut self, dim: usize) -> Result<()> {
        self.dims[dim].guess_bounds()
    }

    /// Whether every horizontal coordinate that can carry bounds has them.
    ///
    /// Single-point coordinates cannot have bounds guessed and are ignored.
    pub fn has_horizontal_bounds(&self) -> bool {
        [self.x_coord(), self.y_coord()]
            .iter()
            .all(|c| c.has_bounds() || c.len() < 2)
    }

    /// Infer bounds on each horizontal coordinate with at least two points,
    /// leaving single-point coordinates unbounded.
    pub fn guess_horizontal_bounds(&mut self) -> Result<()> {
        for dim in [self.x_dim, self.y_dim] {
            if self.dims[dim].len() > 1 {
                self.dims[dim].guess_bounds()?;
            }
        }
        Ok(())
    }

    /// A copy with bounds inferred on both horizontal coordinates.
    pub fn with_guessed_bounds(&self) -> Result<Self> {
        let mut field = self.clone();
        field.guess_bounds(field.x_dim)?;
        field.guess_bounds(field.y_dim)?;
        Ok(field)
    }

    /// Restrict the field to the time steps falling in `year`.
    pub fn extract_year(&self, year: i32) -> Result<Self> {
        let time_dim = self
            .time_dim
            .ok_or_else(|| ShapeCutError::NoTimeCoordinate(self.name.clone()))?;
        let units = self
            .time_units
            .ok_or_else(|| ShapeCutError::InvalidTimeUnits(String::new()))?;

        let mut indices = Vec::new();
        for (i, &t) in self.dims[time_dim].points.iter().enumerate() {
            if units.year_of(t)? == year {
                indices.push(i);
            }
        }

        if indices.is_empty() {
            return Err(ShapeCutError::year_not_available(&self.name, year));
        }

        Ok(self.select_indices(time_dim, &indices))
    }

    /// Calendar years covered by the time coordinate, in order, deduplicated.
    pub fn years(&self) -> Result<Vec<i32>> {
        let (Some(time_dim), Some(units)) = (self.time_dim, self.time_units) else {
            return Ok(Vec::new());
        };
        let mut years = self.dims[time_dim]
            .points
            .iter()
            .map(|&t| units.year_of(t))
            .collect::<Result<Vec<i32>>>()?;
        years.dedup();
        Ok(years)
    }

    /// The first 2D horizontal slice, or `None` when the field is empty.
    ///
    /// Every non-horizontal dimension is fixed at index 0 and the result is
    /// oriented with Y along rows.
    pub fn horizontal_slice(&self) -> Option<HorizontalSlice<'_>> {
        if self.is_empty() {
            return None;
        }

        let mut view: ArrayViewD<'_, f32> = self.data.view();
        for dim in (0..self.dims.len()).rev() {
            if dim != self.x_dim && dim != self.y_dim {
                view = view.index_axis_move(NdAxis(dim), 0);
            }
        }

        let mut values = view.into_dimensionality::<Ix2>().ok()?;
        if self.x_dim < self.y_dim {
            values = values.reversed_axes();
        }

        Some(HorizontalSlice {
            values,
            x: self.x_coord(),
            y: self.y_coord(),
        })
    }

    fn clone_metadata(&self) -> Self {
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            data: ArrayD::zeros(IxDyn(&[])),
            dims: Vec::new(),
            x_dim: self.x_dim,
            y_dim: self.y_dim,
            time_dim: self.time_dim,
            time_units: self.time_units,
            missing_value: self.missing_value,
        }
    }
}

fn find_axis(dims: &[DimCoord], axis: Axis) -> Result<Option<usize>> {
    let mut found = dims.iter().enumerate().filter(|(_, c)| c.axis == axis);
    let first = found.next().map(|(i, _)| i);
    if found.next().is_some() {
        return Err(ShapeCutError::DuplicateAxis(axis));
    }
    Ok(first)
}

fn take_along(data: &ArrayD<f32>, dim: usize, indices: &[usize]) -> ArrayD<f32> {
    if indices.is_empty() {
        let mut shape = data.shape().to_vec();
        shape[dim] = 0;
        return ArrayD::zeros(IxDyn(&shape));
    }
    data.select(NdAxis(dim), indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array};

    fn lat_lon_field() -> GriddedField {
        let data = arr2(&[[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        GriddedField::new(
            "air_temperature",
            data,
            vec![
                DimCoord::new("latitude", Axis::Y, vec![40.0, 30.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0, 10.0, 20.0]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        let result = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("latitude", Axis::Y, vec![0.0, 1.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0, 1.0, 2.0]).unwrap(),
            ],
        );
        assert!(matches!(result, Err(ShapeCutError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_missing_horizontal_coord_is_rejected() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        let result = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("latitude", Axis::Y, vec![0.0, 1.0]).unwrap(),
                DimCoord::new("height", Axis::Other, vec![0.0, 1.0]).unwrap(),
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            ShapeCutError::MissingHorizontalCoord(Axis::X)
        );
    }

    #[test]
    fn test_duplicate_axis_is_rejected() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        let result = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("lon_a", Axis::X, vec![0.0, 1.0]).unwrap(),
                DimCoord::new("lon_b", Axis::X, vec![0.0, 1.0]).unwrap(),
            ],
        );
        assert_eq!(result.unwrap_err(), ShapeCutError::DuplicateAxis(Axis::X));
    }

    #[test]
    fn test_select_indices() {
        let field = lat_lon_field();
        let sub = field.select_indices(field.x_dim(), &[1, 2]);
        assert_eq!(sub.shape(), &[2, 2]);
        assert_eq!(sub.x_coord().points, vec![10.0, 20.0]);
        assert_eq!(sub.data()[[1, 0]], 5.0);
    }

    #[test]
    fn test_select_no_indices_gives_empty_field() {
        let field = lat_lon_field();
        let sub = field.select_indices(field.y_dim(), &[]);
        assert_eq!(sub.shape(), &[0, 3]);
        assert!(sub.is_empty());
        assert!(sub.horizontal_slice().is_none());
    }

    #[test]
    fn test_horizontal_slice_orients_y_on_rows() {
        // (time, x, y) layout
        let data = Array::from_shape_fn((2, 3, 2), |(t, x, y)| (t * 100 + x * 10 + y) as f32)
            .into_dyn();
        let field = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("time", Axis::Time, vec![0.0, 1.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0, 1.0, 2.0]).unwrap(),
                DimCoord::new("latitude", Axis::Y, vec![0.0, 1.0]).unwrap(),
            ],
        )
        .unwrap();

        let slice = field.horizontal_slice().unwrap();
        assert_eq!(slice.values.shape(), &[2, 3]);
        assert_eq!(slice.values[[1, 2]], 21.0);
    }

    #[test]
    fn test_extract_year() {
        let data = Array::from_shape_fn((3, 1, 1), |(t, _, _)| t as f32).into_dyn();
        let units = TimeUnits::parse("days since 2000-01-01").unwrap();
        let field = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("time", Axis::Time, vec![10.0, 400.0, 800.0]).unwrap(),
                DimCoord::new("latitude", Axis::Y, vec![0.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0]).unwrap(),
            ],
        )
        .unwrap()
        .with_time_units(units);

        assert_eq!(field.years().unwrap(), vec![2000, 2001, 2002]);

        let year = field.extract_year(2001).unwrap();
        assert_eq!(year.shape(), &[1, 1, 1]);
        assert_eq!(year.data()[[0, 0, 0]], 1.0);

        assert_eq!(
            field.extract_year(1999).unwrap_err(),
            ShapeCutError::year_not_available("t", 1999)
        );
    }

    #[test]
    fn test_unrepresentable_time_point_is_a_fault() {
        let data = Array::from_shape_fn((2, 1, 1), |(t, _, _)| t as f32).into_dyn();
        let field = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("time", Axis::Time, vec![10.0, 1e17]).unwrap(),
                DimCoord::new("latitude", Axis::Y, vec![0.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0]).unwrap(),
            ],
        )
        .unwrap()
        .with_time_units(TimeUnits::parse("days since 2000-01-01").unwrap());

        assert!(matches!(
            field.years(),
            Err(ShapeCutError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            field.extract_year(2000),
            Err(ShapeCutError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_guess_horizontal_bounds_skips_single_point_axis() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[1, 3]));
        let mut field = GriddedField::new(
            "t",
            data,
            vec![
                DimCoord::new("latitude", Axis::Y, vec![45.0]).unwrap(),
                DimCoord::new("longitude", Axis::X, vec![0.0, 10.0, 20.0]).unwrap(),
            ],
        )
        .unwrap();
        assert!(!field.has_horizontal_bounds());

        field.guess_horizontal_bounds().unwrap();
        assert!(field.x_coord().has_bounds());
        assert!(!field.y_coord().has_bounds());
        assert!(field.has_horizontal_bounds());
    }

    #[test]
    fn test_extract_year_without_time_axis() {
        let field = lat_lon_field();
        assert!(matches!(
            field.extract_year(2000),
            Err(ShapeCutError::NoTimeCoordinate(_))
        ));
    }
}
