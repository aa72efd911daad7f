//! Bounding-box pre-filter.
//!
//! Cuts a field down to the cells whose extent meets a region's bounding
//! rectangle. Masking the full field gives the same answer; this only shrinks
//! the number of cells the boundary mask has to test.

use tracing::trace;

use crate::bbox::BoundingBox;
use crate::field::GriddedField;

/// Smallest sub-field whose horizontal extent covers `bbox`.
///
/// X and Y are selected independently with a closed-interval test against
/// each cell's extent (its bounds, or its point when the coordinate has no
/// bounds). Other dimensions are untouched. A bbox wholly outside the field
/// yields an empty field rather than an error.
pub fn clip_to_bbox(field: &GriddedField, bbox: &BoundingBox) -> GriddedField {
    let x_idx = field.x_coord().indices_within(bbox.min_x, bbox.max_x);
    let y_idx = field.y_coord().indices_within(bbox.min_y, bbox.max_y);

    trace!(
        field = %field.name(),
        x_cells = x_idx.len(),
        y_cells = y_idx.len(),
        "Clipped to bounding box"
    );

    field
        .select_indices(field.x_dim(), &x_idx)
        .select_indices(field.y_dim(), &y_idx)
}
