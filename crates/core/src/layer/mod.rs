//! Vector layer data model
//!
//! A `Layer` is an ordered collection of features sharing one CRS.
//! Layers are inputs and outputs of spatial operations; operations
//! build new layers rather than mutating their inputs.

use geo_types::{Coord, Geometry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::crs::Crs;
use crate::error::{Error, Result};

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Int(i)
                } else {
                    AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => AttributeValue::String(s),
            // Arrays and objects are not part of the attribute model
            other => AttributeValue::String(other.to_string()),
        }
    }
}

impl From<&AttributeValue> for serde_json::Value {
    fn from(v: &AttributeValue) -> Self {
        match v {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Int(i) => serde_json::Value::from(*i),
            AttributeValue::Float(f) => serde_json::Value::from(*f),
            AttributeValue::String(s) => serde_json::Value::from(s.clone()),
        }
    }
}

/// A geographic feature: one geometry plus named attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Geometry<f64>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry and no attributes
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Get an attribute as a number, if present and numeric
    pub fn numeric_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(AttributeValue::as_f64)
    }
}

/// A named collection of features sharing one CRS
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, crs: Crs) -> Self {
        Self {
            name: name.into(),
            crs,
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Check the layer is geometrically usable: every coordinate finite,
    /// every polygon ring closed with at least four coordinates.
    pub fn validate(&self) -> Result<()> {
        for (idx, feature) in self.features.iter().enumerate() {
            if let Some(reason) = invalid_reason(&feature.geometry) {
                return Err(Error::LayerLoad {
                    layer: self.name.clone(),
                    reason: format!("feature {}: {}", idx, reason),
                });
            }
        }
        Ok(())
    }
}

impl IntoIterator for Layer {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

fn coords_finite<'a>(coords: impl Iterator<Item = &'a Coord<f64>>) -> bool {
    coords.into_iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

fn ring_closed(ring: &geo_types::LineString<f64>) -> bool {
    ring.0.len() >= 4 && ring.0.first() == ring.0.last()
}

fn invalid_reason(geometry: &Geometry<f64>) -> Option<String> {
    match geometry {
        Geometry::Point(p) => {
            if p.x().is_finite() && p.y().is_finite() {
                None
            } else {
                Some("non-finite point coordinate".into())
            }
        }
        Geometry::LineString(ls) => {
            if ls.0.len() < 2 {
                Some("line string with fewer than two coordinates".into())
            } else if !coords_finite(ls.0.iter()) {
                Some("non-finite line coordinate".into())
            } else {
                None
            }
        }
        Geometry::Polygon(poly) => polygon_invalid_reason(poly),
        Geometry::MultiPoint(mp) => mp
            .0
            .iter()
            .find_map(|p| invalid_reason(&Geometry::Point(*p))),
        Geometry::MultiLineString(mls) => mls
            .0
            .iter()
            .find_map(|ls| invalid_reason(&Geometry::LineString(ls.clone()))),
        Geometry::MultiPolygon(mp) => mp.0.iter().find_map(polygon_invalid_reason),
        Geometry::Rect(r) => {
            if [r.min(), r.max()]
                .iter()
                .all(|c| c.x.is_finite() && c.y.is_finite())
            {
                None
            } else {
                Some("non-finite rectangle coordinate".into())
            }
        }
        _ => Some("unsupported geometry type".into()),
    }
}

fn polygon_invalid_reason(poly: &geo_types::Polygon<f64>) -> Option<String> {
    if !ring_closed(poly.exterior()) {
        return Some("polygon exterior ring degenerate or not closed".into());
    }
    if !coords_finite(poly.exterior().0.iter()) {
        return Some("non-finite polygon coordinate".into());
    }
    for ring in poly.interiors() {
        if !ring_closed(ring) {
            return Some("polygon interior ring degenerate or not closed".into());
        }
        if !coords_finite(ring.0.iter()) {
            return Some("non-finite polygon coordinate".into());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};

    fn square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_attribute_as_f64() {
        assert_eq!(AttributeValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(AttributeValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(AttributeValue::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_feature_properties() {
        let mut f = Feature::new(Geometry::Point(Point::new(1.0, 2.0)));
        f.set_property("population", AttributeValue::Int(1200));
        assert_eq!(f.numeric_property("population"), Some(1200.0));
        assert_eq!(f.numeric_property("missing"), None);
    }

    #[test]
    fn test_layer_validate_ok() {
        let mut layer = Layer::new("districts", Crs::from_epsg(32633));
        layer.push(Feature::new(Geometry::Polygon(square())));
        assert!(layer.validate().is_ok());
    }

    #[test]
    fn test_layer_validate_degenerate_ring() {
        // Polygon::new closes rings, so a two-point ring stays degenerate
        let degenerate = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]),
            vec![],
        );
        let mut layer = Layer::new("bad", Crs::default());
        layer.push(Feature::new(Geometry::Polygon(degenerate)));
        match layer.validate() {
            Err(Error::LayerLoad { layer, .. }) => assert_eq!(layer, "bad"),
            other => panic!("expected LayerLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_layer_validate_nan() {
        let mut layer = Layer::new("pts", Crs::default());
        layer.push(Feature::new(Geometry::Point(Point::new(f64::NAN, 0.0))));
        assert!(layer.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let v = AttributeValue::from(serde_json::json!(42));
        assert_eq!(v, AttributeValue::Int(42));
        let back = serde_json::Value::from(&v);
        assert_eq!(back, serde_json::json!(42));
    }
}
