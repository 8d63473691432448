//! Layer I/O and input resolution
//!
//! The pipeline consumes `Layer` values regardless of where they come
//! from; a `LayerResolver` turns a logical layer name into a `Layer`.
//! File-based (GeoJSON), in-memory and database-backed resolvers are
//! interchangeable.

mod geojson_io;
#[cfg(feature = "postgres")]
mod postgis;
mod resolver;

pub use geojson_io::{read_geojson, write_geojson};
#[cfg(feature = "postgres")]
pub use postgis::{DatabaseConfig, PostgisResolver};
pub use resolver::{FileResolver, LayerResolver, MemoryResolver};
