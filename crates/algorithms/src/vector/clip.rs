//! Clipping against a polygon mask
//!
//! Restrict a layer's geometries to the portion overlapping a mask,
//! preserving attributes. Features entirely outside the mask are
//! dropped; partially overlapping geometries are cut at the mask edge.

use geo::{BooleanOps, Intersects};
use geo_types::{Geometry, MultiLineString, MultiPoint, MultiPolygon};
use schoolsite_core::{Error, Feature, Layer, Result};

use super::overlay;

/// Clip every feature of `layer` to `mask`.
pub fn clip_to_mask(layer: &Layer, mask: &MultiPolygon<f64>) -> Result<Layer> {
    let mut out = Layer::new(layer.name.clone(), layer.crs.clone());
    for (idx, feature) in layer.iter().enumerate() {
        if let Some(geometry) = clip_geometry(&feature.geometry, mask).map_err(|reason| {
            Error::GeometryOp {
                step: "clip",
                reason: format!("feature {} of layer '{}': {}", idx, layer.name, reason),
            }
        })? {
            out.push(Feature {
                geometry,
                properties: feature.properties.clone(),
                id: feature.id.clone(),
            });
        }
    }
    Ok(out)
}

fn clip_geometry(
    geometry: &Geometry<f64>,
    mask: &MultiPolygon<f64>,
) -> std::result::Result<Option<Geometry<f64>>, String> {
    match geometry {
        Geometry::Point(p) => {
            if mask.intersects(p) {
                Ok(Some(geometry.clone()))
            } else {
                Ok(None)
            }
        }

        Geometry::MultiPoint(mp) => {
            let inside: Vec<_> = mp.0.iter().filter(|p| mask.intersects(*p)).copied().collect();
            if inside.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Geometry::MultiPoint(MultiPoint::new(inside))))
            }
        }

        Geometry::LineString(ls) => {
            clip_lines(&MultiLineString::new(vec![ls.clone()]), mask)
        }

        Geometry::MultiLineString(mls) => clip_lines(mls, mask),

        Geometry::Polygon(p) => clip_areal(&MultiPolygon::new(vec![p.clone()]), mask),

        Geometry::MultiPolygon(mp) => clip_areal(mp, mask),

        other => Err(format!("unsupported geometry type {:?}", other)),
    }
}

fn clip_areal(
    subject: &MultiPolygon<f64>,
    mask: &MultiPolygon<f64>,
) -> std::result::Result<Option<Geometry<f64>>, String> {
    let clipped = overlay::intersection(subject, mask);
    if clipped.0.is_empty() {
        Ok(None)
    } else {
        Ok(Some(overlay::from_multipolygon(clipped)))
    }
}

fn clip_lines(
    lines: &MultiLineString<f64>,
    mask: &MultiPolygon<f64>,
) -> std::result::Result<Option<Geometry<f64>>, String> {
    if mask.0.is_empty() {
        return Ok(None);
    }
    let clipped = mask.clip(lines, false);
    let kept: Vec<_> = clipped.0.into_iter().filter(|ls| ls.0.len() >= 2).collect();
    if kept.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Geometry::MultiLineString(MultiLineString::new(kept))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::{LineString, Point, Polygon};
    use schoolsite_core::{AttributeValue, Crs};

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )
    }

    fn mask() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![rect(0.0, 0.0, 10.0, 10.0)])
    }

    #[test]
    fn test_clip_polygon_partial() {
        let mut layer = Layer::new("population", Crs::from_epsg(32633));
        layer.push(
            Feature::new(Geometry::Polygon(rect(5.0, 0.0, 20.0, 10.0)))
                .with_property("population", AttributeValue::Int(1200)),
        );

        let out = clip_to_mask(&layer, &mask()).unwrap();
        assert_eq!(out.len(), 1);

        let clipped = overlay::as_multipolygon(&out.features[0].geometry).unwrap();
        assert!((clipped.unsigned_area() - 50.0).abs() < 1e-6);
        // Attributes survive the clip
        assert_eq!(out.features[0].numeric_property("population"), Some(1200.0));
    }

    #[test]
    fn test_clip_polygon_outside_dropped() {
        let mut layer = Layer::new("population", Crs::default());
        layer.push(Feature::new(Geometry::Polygon(rect(
            20.0, 20.0, 30.0, 30.0,
        ))));
        let out = clip_to_mask(&layer, &mask()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_clip_points() {
        let mut layer = Layer::new("schools", Crs::default());
        layer.push(Feature::new(Geometry::Point(Point::new(5.0, 5.0))));
        layer.push(Feature::new(Geometry::Point(Point::new(15.0, 5.0))));
        // On the mask edge: kept (mask is a closed region)
        layer.push(Feature::new(Geometry::Point(Point::new(10.0, 5.0))));

        let out = clip_to_mask(&layer, &mask()).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_clip_line() {
        let mut layer = Layer::new("rivers", Crs::default());
        layer.push(Feature::new(Geometry::LineString(LineString::from(vec![
            (-5.0, 5.0),
            (15.0, 5.0),
        ]))));

        let out = clip_to_mask(&layer, &mask()).unwrap();
        assert_eq!(out.len(), 1);
        match &out.features[0].geometry {
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    for c in &ls.0 {
                        assert!(c.x >= -1e-9 && c.x <= 10.0 + 1e-9);
                    }
                }
            }
            other => panic!("expected lines, got {:?}", other),
        }
    }

    #[test]
    fn test_clip_unsupported_geometry() {
        let mut layer = Layer::new("odd", Crs::default());
        layer.push(Feature::new(Geometry::GeometryCollection(
            geo_types::GeometryCollection::default(),
        )));
        let result = clip_to_mask(&layer, &mask());
        assert!(matches!(result, Err(Error::GeometryOp { .. })));
    }
}
