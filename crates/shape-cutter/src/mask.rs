//! Per-cell boundary mask.

use std::borrow::Cow;

use ndarray::Array2;
use tracing::trace;

use crate::bbox::BoundingBox;
use crate::coord::DimCoord;
use crate::error::Result;
use crate::field::HorizontalSlice;
use crate::geometry::RegionGeometry;

/// 2D horizontal mask, rows along Y and columns along X. `true` marks a cell
/// that intersects the region.
pub type Mask = Array2<bool>;

/// Mark every cell of the slice whose rectangle touches the region.
///
/// Coordinates without bounds get them inferred by the midpoint rule, which
/// fails for a coordinate with a single point.
pub fn boundary_mask(slice: &HorizontalSlice<'_>, geometry: &RegionGeometry) -> Result<Mask> {
    let x = bounded(slice.x)?;
    let y = bounded(slice.y)?;
    let bbox = geometry.bounding_box()?;

    let mask = Array2::from_shape_fn((y.len(), x.len()), |(j, i)| {
        let cell = cell_bbox(&x, &y, i, j);

        // Cells clear of the bounding rectangle cannot touch the outline.
        if !cell.intersects(&bbox) {
            return false;
        }
        geometry.intersects_cell(cell.min_x, cell.max_x, cell.min_y, cell.max_y)
    });

    trace!(
        cells = mask.len(),
        inside = mask.iter().filter(|&&m| m).count(),
        "Built boundary mask"
    );

    Ok(mask)
}

/// Rectangle of cell `(col, row)` from the extents of its X and Y cells.
pub fn cell_bbox(x: &DimCoord, y: &DimCoord, col: usize, row: usize) -> BoundingBox {
    let (x_lo, x_hi) = x.cell_extent(col);
    let (y_lo, y_hi) = y.cell_extent(row);
    BoundingBox::new(x_lo, y_lo, x_hi, y_hi)
}

fn bounded(coord: &DimCoord) -> Result<Cow<'_, DimCoord>> {
    if coord.has_bounds() {
        return Ok(Cow::Borrowed(coord));
    }
    let mut owned = coord.clone();
    owned.guess_bounds()?;
    Ok(Cow::Owned(owned))
}
