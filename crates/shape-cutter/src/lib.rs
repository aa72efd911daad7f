//! Clip gridded climate fields to the outline of a geographic region.
//!
//! Cutting runs in two stages: a cheap bounding-box cut, then a per-cell
//! boundary mask over what is left.
//!
//! # Architecture
//!
//! ```text
//! ShapeCutter::cut(field, geometry)
//!      │
//!      ├─► Infer cell bounds on the full grid
//!      │
//!      ├─► Reconcile longitude domain ([-180,180) vs [0,360))
//!      │
//!      ├─► Clip to the geometry's bounding box
//!      │
//!      ├─► Build 2D boundary mask on one horizontal slice
//!      │
//!      └─► Broadcast the mask across time/other dimensions
//!               │
//!               ▼
//!          CutOutcome::Masked(MaskedField) or CutOutcome::NoCoverage
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shape_cutter::{RegionGeometry, ShapeCutter};
//!
//! let geometry = RegionGeometry::from_wkt("POLYGON((-109 37, -102 37, -102 41, -109 41, -109 37))")?;
//! let mean = ShapeCutter::new()
//!     .cut(&field, &geometry)?
//!     .masked()
//!     .and_then(|m| m.mean());
//! ```

pub mod bbox;
pub mod clip;
pub mod coord;
pub mod cutter;
pub mod error;
pub mod field;
pub mod geometry;
pub mod mask;
pub mod reconcile;
pub mod time;

// Re-export commonly used types at crate root
pub use bbox::BoundingBox;
pub use clip::clip_to_bbox;
pub use coord::{Axis, DimCoord};
pub use cutter::{CutOutcome, MaskedField, NoCoverage, ShapeCutter};
pub use error::{Result, ShapeCutError};
pub use field::{GriddedField, HorizontalSlice};
pub use geometry::RegionGeometry;
pub use mask::{boundary_mask, Mask};
pub use reconcile::{reconcile, LonDomain};
pub use time::{TimeStep, TimeUnits};
