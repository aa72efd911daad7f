//! Integration tests for cutting gridded fields to region outlines.

use std::borrow::Cow;

use shape_cutter::mask::cell_bbox;
use shape_cutter::{
    boundary_mask, clip_to_bbox, reconcile, CutOutcome, GriddedField, NoCoverage,
    RegionGeometry, ShapeCutter,
};
use test_utils::{
    assert_mean_approx, cell_interior_wkt, grid, index_field, rectangle_wkt, sample_regions,
    small_field, temperature_field, BEYOND_POLE_WKT, FOUR_CORNERS_WKT,
};

fn cut(field: &GriddedField, wkt: &str) -> CutOutcome {
    let geometry = RegionGeometry::from_wkt(wkt).unwrap();
    ShapeCutter::new().cut(field, &geometry).unwrap()
}

// ============================================================================
// No coverage
// ============================================================================

#[test]
fn test_polygon_beyond_latitude_range_has_no_coverage() {
    let field = index_field(&grid::GLOBAL_10DEG_PM, &[2000]);
    assert!(matches!(
        cut(&field, BEYOND_POLE_WKT),
        CutOutcome::NoCoverage(NoCoverage::EmptySelection)
    ));
}

#[test]
fn test_polygon_outside_regional_grid_has_no_coverage() {
    let field = index_field(&grid::WEST_US_2DEG, &[2000]);
    for wkt in [
        rectangle_wkt(10.0, 35.0, 20.0, 40.0),
        rectangle_wkt(-110.0, -40.0, -100.0, -30.0),
        FOUR_CORNERS_WKT.replace("-104", "-84").replace("-96", "-80"),
    ] {
        assert!(!cut(&field, &wkt).is_covered(), "{wkt} should have no coverage");
    }
}

// ============================================================================
// Polygons inside a single cell
// ============================================================================

#[test]
fn test_polygon_inside_one_cell_selects_that_cell() {
    let spec = grid::WEST_US_2DEG;
    let field = index_field(&spec, &[2000]);

    for (col, row) in [(0, 0), (3, 2), (7, 5), (14, 9)] {
        let masked = cut(&field, &cell_interior_wkt(&spec, col, row, 0.1))
            .masked()
            .unwrap();

        assert_eq!(masked.cells_inside(), 1, "cell ({col}, {row})");
        assert_eq!(masked.mean(), Some((row * 100 + col) as f64));
    }
}

#[test]
fn test_polygon_inside_one_cell_across_longitude_domains() {
    // Outline on [-180, 180), field on [0, 360)
    let field = index_field(&grid::GLOBAL_10DEG, &[2000]);
    let wkt = cell_interior_wkt(&grid::GLOBAL_10DEG_PM, 5, 12, 0.2);

    let masked = cut(&field, &wkt).masked().unwrap();
    assert_eq!(masked.cells_inside(), 1);
    // -125 on the prime-meridian grid is 235, column 23 of the field
    assert_eq!(masked.mean(), Some(1223.0));
}

#[test]
fn test_two_by_two_scenario_mean() {
    let field = small_field(&[0.0, 15.0], &[20.0, 35.0], &[&[1.0, 2.0], &[3.0, 4.0]], 2050);
    let masked = cut(&field, &rectangle_wkt(10.0, 30.0, 20.0, 40.0))
        .masked()
        .unwrap();

    assert_eq!(masked.cells_inside(), 1);
    assert_mean_approx!(masked.mean(), 4.0, 1e-9);
}

// ============================================================================
// Bounding-box clip
// ============================================================================

#[test]
fn test_clip_is_idempotent() {
    let field = index_field(&grid::WEST_US_2DEG, &[2000, 2050])
        .with_guessed_bounds()
        .unwrap();
    let bbox = RegionGeometry::from_wkt(FOUR_CORNERS_WKT)
        .unwrap()
        .bounding_box()
        .unwrap();

    let first = clip_to_bbox(&field, &bbox);
    let second = clip_to_bbox(&field, &bbox);
    assert_eq!(first, second);
    assert_eq!(clip_to_bbox(&first, &bbox), first);
    // Time is untouched
    assert_eq!(first.shape()[0], 2);
}

#[test]
fn test_prefilter_is_a_superset_of_the_mask() {
    let field = temperature_field(&grid::GLOBAL_10DEG_PM, &[2000], 0.0);

    for region in sample_regions() {
        let geometry = RegionGeometry::from_wkt(&region.geometry).unwrap();
        let fast = ShapeCutter::new().cut(&field, &geometry).unwrap();
        let full = ShapeCutter::without_prefilter().cut(&field, &geometry).unwrap();

        assert_eq!(fast.is_covered(), full.is_covered(), "{}", region.code);
        if let (Some(fast), Some(full)) = (fast.masked(), full.masked()) {
            assert_eq!(fast.cells_inside(), full.cells_inside(), "{}", region.code);
            assert_eq!(fast.mean(), full.mean(), "{}", region.code);
        }
    }
}

// ============================================================================
// Boundary mask
// ============================================================================

#[test]
fn test_cell_matching_polygon_bbox_is_masked() {
    let field = index_field(&grid::WEST_US_2DEG, &[])
        .with_guessed_bounds()
        .unwrap();
    let slice = field.horizontal_slice().unwrap();

    // Cell (3, 2) spans x [-120, -118], y [34, 36]
    let geometry = RegionGeometry::from_wkt(&rectangle_wkt(-120.0, 34.0, -118.0, 36.0)).unwrap();
    let mask = boundary_mask(&slice, &geometry).unwrap();
    assert!(mask[[2, 3]]);
}

#[test]
fn test_cells_outside_bbox_are_never_masked() {
    let field = index_field(&grid::WEST_US_2DEG, &[])
        .with_guessed_bounds()
        .unwrap();
    let slice = field.horizontal_slice().unwrap();

    let geometry =
        RegionGeometry::from_wkt("POLYGON((-119 33, -105 35.5, -112 47, -119 33))").unwrap();
    let bbox = geometry.bounding_box().unwrap();
    let mask = boundary_mask(&slice, &geometry).unwrap();

    for ((row, col), &inside) in mask.indexed_iter() {
        if !cell_bbox(slice.x, slice.y, col, row).intersects(&bbox) {
            assert!(!inside, "cell ({col}, {row}) lies outside the bounding box");
        }
    }
    assert!(mask.iter().any(|&m| m));
}

#[test]
fn test_four_corners_touches_four_cells() {
    let field = temperature_field(&grid::GLOBAL_10DEG_PM, &[2000], 0.0);
    let masked = cut(&field, FOUR_CORNERS_WKT).masked().unwrap();
    assert_eq!(masked.cells_inside(), 4);
    assert_eq!(masked.field().shape(), &[1, 2, 2]);
}

#[test]
fn test_mask_broadcasts_over_time() {
    let years = [2000, 2050, 2100];
    let field = temperature_field(&grid::GLOBAL_10DEG_PM, &years, 1.5);
    let masked = cut(&field, FOUR_CORNERS_WKT).masked().unwrap();

    let per_step = masked.collapse_horizontal_mean();
    assert_eq!(per_step.shape(), &[3]);

    let first = per_step[[0]].unwrap();
    let last = per_step[[2]].unwrap();
    test_utils::assert_approx_eq!(last - first, 3.0, 1e-3);
}

// ============================================================================
// Longitude reconciliation
// ============================================================================

#[test]
fn test_reconcile_round_trip_selects_same_subset() {
    let field = index_field(&grid::GLOBAL_10DEG, &[2000]);
    let prime = RegionGeometry::from_wkt(FOUR_CORNERS_WKT).unwrap();
    let dateline = prime.translated_x(360.0);

    let transformed = reconcile(&field, &prime.bounding_box().unwrap()).into_owned();
    assert_eq!(transformed.x_coord().min_point(), Some(-175.0));

    let restored = reconcile(&transformed, &dateline.bounding_box().unwrap());
    assert!(matches!(restored, Cow::Owned(_)));
    assert_eq!(*restored, field);

    // Already on the outline's convention: nothing is copied
    assert!(matches!(
        reconcile(&field, &dateline.bounding_box().unwrap()),
        Cow::Borrowed(_)
    ));

    let a = ShapeCutter::new().cut(&field, &prime).unwrap().masked().unwrap();
    let b = ShapeCutter::new()
        .cut(&transformed, &dateline)
        .unwrap()
        .masked()
        .unwrap();
    assert_eq!(a.cells_inside(), b.cells_inside());
    assert_eq!(a.masked_data(), b.masked_data());
    assert_eq!(a.mean(), b.mean());
}
