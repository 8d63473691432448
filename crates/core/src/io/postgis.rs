//! PostGIS-backed layer resolver
//!
//! Geometry is fetched as WKT via `ST_AsText`, attributes as JSONB.
//! Connection parameters come from a `DatabaseConfig` supplied at
//! construction time.

use postgres::{Client, NoTls};
use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::layer::{AttributeValue, Feature, Layer};

use super::resolver::LayerResolver;

/// Connection parameters for a PostGIS database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    fn conninfo(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

/// Resolver mapping a layer name to a table in one schema
pub struct PostgisResolver {
    config: DatabaseConfig,
    schema: String,
    geometry_column: String,
    crs: Crs,
}

impl PostgisResolver {
    pub fn new(
        config: DatabaseConfig,
        schema: impl Into<String>,
        geometry_column: impl Into<String>,
        crs: Crs,
    ) -> Self {
        Self {
            config,
            schema: schema.into(),
            geometry_column: geometry_column.into(),
            crs,
        }
    }
}

impl LayerResolver for PostgisResolver {
    fn resolve(&self, name: &str) -> Result<Layer> {
        if !is_safe_identifier(name) {
            return Err(Error::LayerLoad {
                layer: name.to_string(),
                reason: "table name must be a plain SQL identifier".to_string(),
            });
        }

        let mut client = Client::connect(&self.config.conninfo(), NoTls)?;
        let sql = format!(
            "SELECT ST_AsText({g}) AS wkt, to_jsonb(t) - '{g}' AS props FROM {s}.{t} t",
            g = self.geometry_column,
            s = self.schema,
            t = name,
        );

        let mut layer = Layer::new(name, self.crs.clone());
        for row in client.query(sql.as_str(), &[])? {
            let text: String = row.get(0);
            let props: serde_json::Value = row.get(1);

            let mut feature = Feature::new(parse_wkt(&text)?);
            if let serde_json::Value::Object(map) = props {
                for (key, value) in map {
                    feature.set_property(key, AttributeValue::from(value));
                }
            }
            layer.push(feature);
        }

        if layer.is_empty() {
            return Err(Error::LayerLoad {
                layer: name.to_string(),
                reason: "table has no rows".to_string(),
            });
        }
        Ok(layer)
    }
}

fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse WKT text into a geo-types geometry
fn parse_wkt(text: &str) -> Result<geo_types::Geometry<f64>> {
    use std::str::FromStr;
    wkt::Wkt::from_str(text)
        .map_err(|e| Error::Format(format!("WKT parse: {:?}", e)))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| Error::Format(format!("WKT convert: {:?}", e)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wkt_polygon() {
        let geom = parse_wkt("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))").unwrap();
        assert!(matches!(geom, geo_types::Geometry::Polygon(_)));
    }

    #[test]
    fn test_parse_wkt_invalid() {
        assert!(parse_wkt("POLYGO((0 0))").is_err());
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_safe_identifier("schools"));
        assert!(!is_safe_identifier("schools; drop table"));
    }

    #[test]
    fn test_conninfo() {
        let config = DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            database: "locator".into(),
            user: "gis".into(),
            password: "secret".into(),
        };
        assert!(config.conninfo().contains("dbname=locator"));
    }
}
