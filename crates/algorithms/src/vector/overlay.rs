//! Polygon set operations
//!
//! Thin wrappers over the geometry engine's boolean operations, plus
//! dissolve (n-way union). All operands are multi-polygons; callers
//! wrap single polygons as needed.

use geo::BooleanOps;
use geo_types::{Geometry, MultiPolygon, Polygon};

/// Geometric union of two polygon sets
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() {
        return b.clone();
    }
    if b.0.is_empty() {
        return a.clone();
    }
    a.union(b)
}

/// Geometric intersection of two polygon sets
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    a.intersection(b)
}

/// Geometric difference `a - b`
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    if b.0.is_empty() {
        return a.clone();
    }
    a.difference(b)
}

/// Dissolve a set of polygons into one non-overlapping polygon set
pub fn dissolve(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut iter = polygons.into_iter();
    let Some(first) = iter.next() else {
        return MultiPolygon::new(vec![]);
    };
    let mut merged = MultiPolygon::new(vec![first]);
    for polygon in iter {
        merged = merged.union(&MultiPolygon::new(vec![polygon]));
    }
    merged
}

/// View a geometry as a polygon set, if it is areal
pub fn as_multipolygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        _ => None,
    }
}

/// Collapse a polygon set back to the simplest geometry that holds it
pub fn from_multipolygon(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        Geometry::Polygon(mp.0.remove(0))
    } else {
        Geometry::MultiPolygon(mp)
    }
}
