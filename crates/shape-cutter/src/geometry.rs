//! Region outlines as planar polygons.

use geo::{
    coord, Area, BoundingRect, Centroid, Coord, Intersects, LineString, MultiPolygon, Polygon,
    Rect, Translate,
};

use crate::bbox::BoundingBox;
use crate::error::{Result, ShapeCutError};

/// The boundary of one region: one or more polygons, possibly with holes.
///
/// Coordinates are (x, y), i.e. (longitude, latitude) for geographic data.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    shape: MultiPolygon<f64>,
}

impl RegionGeometry {
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self {
            shape: MultiPolygon::new(vec![polygon]),
        }
    }

    pub fn from_multi_polygon(shape: MultiPolygon<f64>) -> Self {
        Self { shape }
    }

    /// Axis-aligned rectangle `(min_x, min_y)..(max_x, max_y)` as a geometry.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let rect = Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y });
        Self::from_polygon(rect.to_polygon())
    }

    /// Parse a WKT `POLYGON` or `MULTIPOLYGON`.
    ///
    /// Accepts formats:
    /// - `POLYGON((x1 y1, x2 y2, x3 y3, x1 y1))`
    /// - `POLYGON((outer ring), (hole), ...)`
    /// - `MULTIPOLYGON(((ring1)), ((ring2), (hole)))`
    /// - `POLYGON EMPTY` / `MULTIPOLYGON EMPTY`
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let wkt = wkt.trim();
        let upper = wkt.to_uppercase();

        let (is_multi, rest) = if upper.starts_with("MULTIPOLYGON") {
            (true, &wkt["MULTIPOLYGON".len()..])
        } else if upper.starts_with("POLYGON") {
            (false, &wkt["POLYGON".len()..])
        } else {
            return Err(ShapeCutError::invalid_wkt(
                "Expected POLYGON or MULTIPOLYGON format",
            ));
        };

        let rest = rest.trim();
        if rest.eq_ignore_ascii_case("EMPTY") {
            return Ok(Self::from_multi_polygon(MultiPolygon::new(Vec::new())));
        }

        let body = outer_group(rest)?;
        let polygons = if is_multi {
            split_groups(body)?
                .into_iter()
                .map(parse_polygon_body)
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![parse_polygon_body(body)?]
        };

        if polygons.is_empty() {
            return Err(ShapeCutError::invalid_wkt(
                "MULTIPOLYGON must contain at least one polygon",
            ));
        }

        Ok(Self::from_multi_polygon(MultiPolygon::new(polygons)))
    }

    pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    pub fn is_empty(&self) -> bool {
        self.shape.0.iter().all(|p| p.exterior().0.is_empty())
    }

    /// The bounding rectangle; an empty geometry has none.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let rect = self
            .shape
            .bounding_rect()
            .ok_or(ShapeCutError::EmptyGeometry)?;
        Ok(BoundingBox::new(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
        ))
    }

    /// Whether the rectangular cell shares any point with the region,
    /// boundary contact included.
    pub fn intersects_cell(&self, x_lo: f64, x_hi: f64, y_lo: f64, y_hi: f64) -> bool {
        let cell = Rect::new(coord! { x: x_lo, y: y_lo }, coord! { x: x_hi, y: y_hi });
        self.shape.intersects(&cell)
    }

    /// Planar area in squared coordinate units.
    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// Planar centroid as `(x, y)`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.shape.centroid().map(|p| (p.x(), p.y()))
    }

    /// The same outline shifted along X, e.g. by ±360 degrees.
    pub fn translated_x(&self, offset: f64) -> Self {
        Self {
            shape: self.shape.translate(offset, 0.0),
        }
    }
}

impl From<Polygon<f64>> for RegionGeometry {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::from_polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for RegionGeometry {
    fn from(shape: MultiPolygon<f64>) -> Self {
        Self::from_multi_polygon(shape)
    }
}

/// Content of the single parenthesised group making up `s`.
fn outer_group(s: &str) -> Result<&str> {
    let groups = split_groups(s)?;
    match groups.as_slice() {
        [body] => Ok(body),
        _ => Err(ShapeCutError::invalid_wkt(format!(
            "Expected one parenthesised group, got {}",
            groups.len()
        ))),
    }
}

/// Split `(a), (b), ...` into the inner contents `a`, `b`, ...
fn split_groups(s: &str) -> Result<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in s.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(ShapeCutError::invalid_wkt("Unbalanced parentheses"));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(&s[start..i]);
                }
            }
            ',' | ' ' | '\t' | '\n' | '\r' => {}
            _ if depth == 0 => {
                return Err(ShapeCutError::invalid_wkt(format!(
                    "Unexpected character '{}' outside parentheses",
                    ch
                )));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ShapeCutError::invalid_wkt("Unbalanced parentheses"));
    }

    Ok(groups)
}

/// Parse `(outer), (hole), ...` into a polygon.
fn parse_polygon_body(body: &str) -> Result<Polygon<f64>> {
    let mut rings = split_groups(body)?
        .into_iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let exterior = rings
        .next()
        .ok_or_else(|| ShapeCutError::invalid_wkt("Polygon has no rings"))?;

    Ok(Polygon::new(exterior, rings.collect()))
}

/// Parse a single ring from a coordinate list.
fn parse_ring(coords_str: &str) -> Result<LineString<f64>> {
    let points: Vec<Coord<f64>> = coords_str
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let parts: Vec<&str> = pair.split_whitespace().collect();
            if parts.len() != 2 {
                return Err(ShapeCutError::invalid_wkt(format!(
                    "Expected 'x y' format, got '{}'",
                    pair
                )));
            }

            let parse = |part: &str| {
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        ShapeCutError::invalid_wkt(format!("Invalid coordinate '{}'", part))
                    })
            };

            Ok(coord! { x: parse(parts[0])?, y: parse(parts[1])? })
        })
        .collect::<Result<_>>()?;

    if points.len() < 3 {
        return Err(ShapeCutError::invalid_wkt(
            "Ring must have at least 3 points",
        ));
    }

    Ok(LineString::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let geom =
            RegionGeometry::from_wkt("POLYGON((-100 35, -98 35, -98 37, -100 37, -100 35))")
                .unwrap();
        assert_eq!(geom.as_multi_polygon().0.len(), 1);
        assert_eq!(
            geom.bounding_box().unwrap(),
            BoundingBox::new(-100.0, 35.0, -98.0, 37.0)
        );
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let geom = RegionGeometry::from_wkt(
            "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (4 4, 6 4, 6 6, 4 6, 4 4))",
        )
        .unwrap();
        let polygon = &geom.as_multi_polygon().0[0];
        assert_eq!(polygon.interiors().len(), 1);
        assert!((geom.area() - 96.0).abs() < 1e-9);
        assert!(!geom.intersects_cell(4.5, 5.5, 4.5, 5.5));
        assert!(geom.intersects_cell(3.0, 5.0, 3.0, 5.0));
    }

    #[test]
    fn test_parse_multipolygon() {
        let geom = RegionGeometry::from_wkt(
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 1, 0 0)), ((5 5, 6 5, 6 6, 5 6, 5 5)))",
        )
        .unwrap();
        assert_eq!(geom.as_multi_polygon().0.len(), 2);
        assert_eq!(
            geom.bounding_box().unwrap(),
            BoundingBox::new(0.0, 0.0, 6.0, 6.0)
        );
        assert!(!geom.intersects_cell(2.0, 3.0, 2.0, 3.0));
    }

    #[test]
    fn test_parse_lowercase_and_empty() {
        assert!(RegionGeometry::from_wkt("polygon((0 0, 1 0, 1 1, 0 0))").is_ok());

        let empty = RegionGeometry::from_wkt("POLYGON EMPTY").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.bounding_box(), Err(ShapeCutError::EmptyGeometry));
    }

    #[test]
    fn test_parse_invalid_wkt() {
        assert!(RegionGeometry::from_wkt("POINT(0 0)").is_err());
        assert!(RegionGeometry::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 0)").is_err());
        assert!(RegionGeometry::from_wkt("POLYGON((0 0, 1 0))").is_err());
        assert!(RegionGeometry::from_wkt("POLYGON((0 0, 1 x, 1 1, 0 0))").is_err());
    }

    #[test]
    fn test_touching_cell_intersects() {
        let geom = RegionGeometry::rectangle(10.0, 30.0, 20.0, 40.0);
        assert!(geom.intersects_cell(0.0, 10.0, 30.0, 40.0));
        assert!(geom.intersects_cell(20.0, 30.0, 40.0, 50.0));
        assert!(!geom.intersects_cell(20.5, 30.0, 30.0, 40.0));
    }

    #[test]
    fn test_area_and_centroid() {
        let geom = RegionGeometry::rectangle(0.0, 0.0, 4.0, 2.0);
        assert!((geom.area() - 8.0).abs() < 1e-12);
        assert_eq!(geom.centroid(), Some((2.0, 1.0)));
    }

    #[test]
    fn test_translated_x() {
        let geom = RegionGeometry::rectangle(-100.0, 30.0, -90.0, 40.0).translated_x(360.0);
        assert_eq!(
            geom.bounding_box().unwrap(),
            BoundingBox::new(260.0, 30.0, 270.0, 40.0)
        );
    }
}
