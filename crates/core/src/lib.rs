//! # schoolsite Core
//!
//! Core types and I/O for school-site suitability analysis.
//!
//! This crate provides:
//! - `Layer` / `Feature`: vector data model with typed attributes
//! - `Crs`: Coordinate Reference System handling
//! - `LayerResolver`: uniform input resolution (memory, GeoJSON file,
//!   PostGIS behind the `postgres` feature)
//! - GeoJSON reading and writing

pub mod crs;
pub mod error;
pub mod io;
pub mod layer;

pub use crs::Crs;
pub use error::{Error, Result};
pub use layer::{AttributeValue, Feature, Layer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::io::LayerResolver;
    pub use crate::layer::{AttributeValue, Feature, Layer};
}
