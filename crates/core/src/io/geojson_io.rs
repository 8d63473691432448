//! GeoJSON reading and writing
//!
//! GeoJSON is the native on-disk format for layers. RFC 7946 mandates
//! WGS84, but locally produced files routinely carry projected
//! coordinates, so the caller states the CRS the file actually uses.

use std::fs;
use std::path::Path;

use geojson::{FeatureCollection as GjFeatureCollection, GeoJson};

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::layer::{AttributeValue, Feature, Layer};

/// Read a GeoJSON file into a `Layer`.
///
/// The layer name is taken from the file stem. Features without a
/// geometry are skipped.
pub fn read_geojson<P: AsRef<Path>>(path: P, crs: Crs) -> Result<Layer> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string());

    let raw = fs::read_to_string(path).map_err(|e| Error::LayerLoad {
        layer: name.clone(),
        reason: e.to_string(),
    })?;
    let geojson: GeoJson = raw.parse()?;
    let collection = GjFeatureCollection::try_from(geojson)?;

    let mut layer = Layer::new(name, crs);
    for gj_feature in collection.features {
        let Some(geometry) = gj_feature.geometry else {
            continue;
        };
        let geometry = geo_types::Geometry::<f64>::try_from(geometry.value)?;

        let mut feature = Feature::new(geometry);
        if let Some(id) = gj_feature.id {
            feature.id = Some(match id {
                geojson::feature::Id::String(s) => s,
                geojson::feature::Id::Number(n) => n.to_string(),
            });
        }
        if let Some(properties) = gj_feature.properties {
            for (key, value) in properties {
                feature.set_property(key, AttributeValue::from(value));
            }
        }
        layer.push(feature);
    }

    Ok(layer)
}

/// Write a `Layer` to a GeoJSON file.
pub fn write_geojson<P: AsRef<Path>>(layer: &Layer, path: P) -> Result<()> {
    let features = layer
        .iter()
        .map(|feature| {
            let mut properties = serde_json::Map::new();
            for (key, value) in &feature.properties {
                properties.insert(key.clone(), serde_json::Value::from(value));
            }
            geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &feature.geometry,
                ))),
                id: feature
                    .id
                    .clone()
                    .map(geojson::feature::Id::String),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = GjFeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, LineString, Point, Polygon};

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("schoolsite-geojson-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip() {
        let mut layer = Layer::new("schools", Crs::from_epsg(32633));
        layer.push(
            Feature::new(Geometry::Point(Point::new(500.0, 500.0)))
                .with_property("name", AttributeValue::String("central".into())),
        );
        layer.push(Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        ))));

        let path = scratch_path("roundtrip.geojson");
        write_geojson(&layer, &path).unwrap();
        let back = read_geojson(&path, Crs::from_epsg(32633)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.len(), 2);
        assert!(back.name.ends_with("roundtrip"));
        let point = back
            .iter()
            .find(|f| matches!(f.geometry, Geometry::Point(_)))
            .unwrap();
        assert_eq!(
            point.get_property("name"),
            Some(&AttributeValue::String("central".into()))
        );
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_geojson(scratch_path("does-not-exist.geojson"), Crs::default());
        assert!(matches!(result, Err(Error::LayerLoad { .. })));
    }
}
