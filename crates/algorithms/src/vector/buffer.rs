//! Buffer operations
//!
//! Expand geometries by a fixed distance to build exclusion zones.
//! Circular arcs are approximated with a fixed number of segments per
//! quarter arc; line corridors are built from per-segment quads with
//! round joins at the vertices.

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use schoolsite_core::{Error, Layer, Result};
use std::f64::consts::PI;

use super::overlay;

/// Parameters for buffer operations
#[derive(Debug, Clone)]
pub struct BufferParams {
    /// Buffer distance in CRS units (non-negative)
    pub distance: f64,
    /// Segments per quarter arc when approximating circles
    pub quadrant_segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            quadrant_segments: 5,
        }
    }
}

impl BufferParams {
    fn circle_segments(&self) -> usize {
        4 * self.quadrant_segments.max(1)
    }
}

/// Circular buffer around a point, approximated as a polygon
pub fn buffer_point(point: &Point<f64>, params: &BufferParams) -> Polygon<f64> {
    circle(point.x(), point.y(), params.distance, params.circle_segments())
}

fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Polygon<f64> {
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// Rectangle covering one segment offset by `r` on both sides.
/// Zero-length segments contribute nothing.
fn segment_quad(a: Coord<f64>, b: Coord<f64>, r: f64) -> Option<Polygon<f64>> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return None;
    }
    let nx = -dy / len * r;
    let ny = dx / len * r;
    Some(Polygon::new(
        LineString::from(vec![
            (a.x + nx, a.y + ny),
            (b.x + nx, b.y + ny),
            (b.x - nx, b.y - ny),
            (a.x - nx, a.y - ny),
            (a.x + nx, a.y + ny),
        ]),
        vec![],
    ))
}

/// Corridor pieces for a line string: one quad per segment plus a
/// vertex circle per coordinate (round joins and caps)
fn buffer_linestring(ls: &LineString<f64>, params: &BufferParams) -> Vec<Polygon<f64>> {
    let mut pieces = Vec::new();
    if params.distance <= 0.0 {
        return pieces;
    }
    for window in ls.0.windows(2) {
        if let Some(quad) = segment_quad(window[0], window[1], params.distance) {
            pieces.push(quad);
        }
    }
    for coord in &ls.0 {
        pieces.push(circle(
            coord.x,
            coord.y,
            params.distance,
            params.circle_segments(),
        ));
    }
    pieces
}

/// Buffer pieces for a polygon: the polygon itself plus corridors
/// along every ring, so the result grows outward and holes shrink
fn buffer_polygon(poly: &Polygon<f64>, params: &BufferParams) -> Vec<Polygon<f64>> {
    let mut pieces = vec![poly.clone()];
    if params.distance > 0.0 {
        pieces.extend(buffer_linestring(poly.exterior(), params));
        for ring in poly.interiors() {
            pieces.extend(buffer_linestring(ring, params));
        }
    }
    pieces
}

/// Buffer every feature of a layer and dissolve the results into one
/// polygon set with no internal overlaps.
///
/// Point and line features with a zero distance produce no area; an
/// empty layer produces the empty polygon set.
pub fn buffer_layer(layer: &Layer, params: &BufferParams) -> Result<MultiPolygon<f64>> {
    let mut pieces = Vec::new();
    for (idx, feature) in layer.iter().enumerate() {
        match &feature.geometry {
            Geometry::Point(p) => {
                if params.distance > 0.0 {
                    pieces.push(buffer_point(p, params));
                }
            }
            Geometry::MultiPoint(mp) => {
                if params.distance > 0.0 {
                    pieces.extend(mp.0.iter().map(|p| buffer_point(p, params)));
                }
            }
            Geometry::LineString(ls) => pieces.extend(buffer_linestring(ls, params)),
            Geometry::MultiLineString(mls) => {
                pieces.extend(mls.0.iter().flat_map(|ls| buffer_linestring(ls, params)))
            }
            Geometry::Polygon(poly) => pieces.extend(buffer_polygon(poly, params)),
            Geometry::MultiPolygon(mp) => {
                pieces.extend(mp.0.iter().flat_map(|p| buffer_polygon(p, params)))
            }
            other => {
                return Err(Error::GeometryOp {
                    step: "buffer",
                    reason: format!(
                        "feature {} of layer '{}' has unsupported geometry {:?}",
                        idx,
                        layer.name,
                        geometry_kind(other)
                    ),
                });
            }
        }
    }
    Ok(overlay::dissolve(pieces))
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
