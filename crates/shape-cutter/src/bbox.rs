//! Bounding rectangle of a region geometry or a grid cell.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in the horizontal coordinates of a field.
///
/// For geographic fields the X axis is longitude and the Y axis latitude,
/// both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Check if this bbox shares any point with another, edges included.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Whether the X extent is expressed on the [0, 360) longitude domain.
    ///
    /// Only the maximum X is consulted; exactly 180 counts as [-180, 180).
    pub fn dateline_centred(&self) -> bool {
        crate::reconcile::dateline_centred(self.max_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_boxes_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        let c = BoundingBox::new(10.5, 0.0, 20.0, 10.0);
        let corner = BoundingBox::new(10.0, 10.0, 12.0, 12.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(a.intersects(&corner));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_dateline_centred() {
        assert!(BoundingBox::new(250.0, 30.0, 260.0, 40.0).dateline_centred());
        assert!(!BoundingBox::new(-110.0, 30.0, -100.0, 40.0).dateline_centred());
        assert!(!BoundingBox::new(170.0, 30.0, 180.0, 40.0).dateline_centred());
    }
}
