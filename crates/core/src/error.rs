//! Error types for schoolsite

use thiserror::Error;

/// Main error type for schoolsite operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to load layer '{layer}': {reason}")]
    LayerLoad { layer: String, reason: String },

    #[error("No feature matched {field} = '{value}'")]
    NoMatch { field: String, value: String },

    #[error("Geometry operation failed at step '{step}': {reason}")]
    GeometryOp { step: &'static str, reason: String },

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Format error: {0}")]
    Format(String),

    #[error("Database error: {0}")]
    #[cfg(feature = "postgres")]
    Database(String),
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::Format(e.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<postgres::Error> for Error {
    fn from(e: postgres::Error) -> Self {
        Error::Database(e.to_string())
    }
}

/// Result type alias for schoolsite operations
pub type Result<T> = std::result::Result<T, Error>;
