//! Layer resolvers
//!
//! A resolver maps a logical layer name ("population", "schools", ...)
//! to a concrete `Layer`. Which resolver backs a given run is
//! configuration, not pipeline logic.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::layer::Layer;

use super::geojson_io::read_geojson;

/// Resolve a named logical layer to a `Layer`
pub trait LayerResolver {
    fn resolve(&self, name: &str) -> Result<Layer>;
}

/// Resolver over layers already loaded in memory
#[derive(Debug, Default)]
pub struct MemoryResolver {
    layers: HashMap<String, Layer>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer under its own name
    pub fn insert(&mut self, layer: Layer) {
        self.layers.insert(layer.name.clone(), layer);
    }
}

impl LayerResolver for MemoryResolver {
    fn resolve(&self, name: &str) -> Result<Layer> {
        self.layers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::LayerLoad {
                layer: name.to_string(),
                reason: "layer not registered".to_string(),
            })
    }
}

/// Resolver mapping `name` to `<base_dir>/<name>.geojson`
#[derive(Debug)]
pub struct FileResolver {
    base_dir: PathBuf,
    crs: Crs,
}

impl FileResolver {
    pub fn new(base_dir: impl Into<PathBuf>, crs: Crs) -> Self {
        Self {
            base_dir: base_dir.into(),
            crs,
        }
    }
}

impl LayerResolver for FileResolver {
    fn resolve(&self, name: &str) -> Result<Layer> {
        let path = self.base_dir.join(format!("{}.geojson", name));
        if !path.is_file() {
            return Err(Error::LayerLoad {
                layer: name.to_string(),
                reason: format!("no such file: {}", path.display()),
            });
        }
        let mut layer = read_geojson(&path, self.crs.clone())?;
        layer.name = name.to_string();
        Ok(layer)
    }
}
