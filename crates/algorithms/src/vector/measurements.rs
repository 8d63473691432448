//! Geometric measurements

use geo::Area as GeoArea;
use geo_types::Geometry;
use schoolsite_core::Layer;

/// Area of a geometry in CRS units squared.
///
/// Non-areal geometries measure zero.
pub fn area(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        Geometry::Rect(r) => r.unsigned_area(),
        _ => 0.0,
    }
}

/// Total area of every feature in a layer
pub fn total_area(layer: &Layer) -> f64 {
    layer.iter().map(|f| area(&f.geometry)).sum()
}
