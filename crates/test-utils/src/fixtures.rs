//! Common test fixtures for climate-region-means tests.
//!
//! This module provides pre-defined grids, regions and scenario names that
//! represent common situations when cutting climate fields to regions.

use serde::Serialize;

/// Common grid specifications for testing.
pub mod grid {
    /// Global 10 degree grid on the [0, 360) longitude domain.
    pub const GLOBAL_10DEG: GridSpec = GridSpec {
        width: 36,
        height: 18,
        min_x: 5.0,
        min_y: -85.0,
        dx: 10.0,
        dy: 10.0,
    };

    /// Global 10 degree grid on the [-180, 180) longitude domain.
    pub const GLOBAL_10DEG_PM: GridSpec = GridSpec {
        width: 36,
        height: 18,
        min_x: -175.0,
        min_y: -85.0,
        dx: 10.0,
        dy: 10.0,
    };

    /// Small regional grid over western North America, 2 degree cells.
    pub const WEST_US_2DEG: GridSpec = GridSpec {
        width: 15,
        height: 10,
        min_x: -125.0,
        min_y: 31.0,
        dx: 2.0,
        dy: 2.0,
    };

    /// Grid specification for testing.
    ///
    /// Points sit at cell centres: `x_i = min_x + i * dx`.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_x: f64,
        pub min_y: f64,
        pub dx: f64,
        pub dy: f64,
    }

    impl GridSpec {
        /// Returns the total number of horizontal cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        pub fn x_points(&self) -> Vec<f64> {
            (0..self.width).map(|i| self.min_x + i as f64 * self.dx).collect()
        }

        pub fn y_points(&self) -> Vec<f64> {
            (0..self.height).map(|j| self.min_y + j as f64 * self.dy).collect()
        }

        /// Outer cell edges as (min_x, min_y, max_x, max_y).
        pub fn extent(&self) -> (f64, f64, f64, f64) {
            (
                self.min_x - self.dx / 2.0,
                self.min_y - self.dy / 2.0,
                self.min_x + (self.width as f64 - 0.5) * self.dx,
                self.min_y + (self.height as f64 - 0.5) * self.dy,
            )
        }
    }
}

pub use grid::GridSpec;

/// Scenario identifiers used by the sample datasets.
pub mod scenarios {
    pub const A1B: &str = "a1b";
    pub const E1: &str = "e1";
}

/// Time axis conventions for generated fields.
pub mod time {
    /// Units of every generated time coordinate.
    pub const UNITS: &str = "days since 1860-01-01 00:00:00";

    /// Years covered by the standard sample dataset.
    pub const YEARS: [i32; 3] = [2000, 2050, 2100];
}

/// A region row as written to a regions file.
#[derive(Debug, Clone, Serialize)]
pub struct RegionFixture {
    pub code: String,
    pub name: String,
    pub geometry: String,
}

impl RegionFixture {
    pub fn new(code: &str, name: &str, geometry: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            geometry: geometry.into(),
        }
    }
}

/// WKT for a region over the Four Corners, spanning four 10 degree cells.
pub const FOUR_CORNERS_WKT: &str = "POLYGON((-104 36, -96 36, -96 44, -104 44, -104 36))";

/// Two small islands in different hemispheres.
pub const ISLANDS_WKT: &str =
    "MULTIPOLYGON(((11 11, 14 11, 14 14, 11 14, 11 11)), ((151 -29, 154 -29, 154 -26, 151 -26, 151 -29)))";

/// A square with a hole; every touched cell still counts.
pub const LAKE_WKT: &str =
    "POLYGON((20 40, 40 40, 40 60, 20 60, 20 40), (24 44, 36 44, 36 56, 24 56, 24 44))";

/// A region north of any latitude a grid can hold.
pub const BEYOND_POLE_WKT: &str = "POLYGON((0 95, 5 95, 5 99, 0 99, 0 95))";

/// Standard region table used by the sample datasets.
pub fn sample_regions() -> Vec<RegionFixture> {
    vec![
        RegionFixture::new("R01", "Four Corners", FOUR_CORNERS_WKT),
        RegionFixture::new("R02", "Islands", ISLANDS_WKT),
        RegionFixture::new("R03", "Lake District", LAKE_WKT),
        RegionFixture::new("R99", "Beyond the Pole", BEYOND_POLE_WKT),
    ]
}
