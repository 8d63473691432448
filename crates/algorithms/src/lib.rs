//! # schoolsite Algorithms
//!
//! Vector operations and the school-site suitability pipeline.
//!
//! The building blocks live in [`vector`] (attribute filter, clip,
//! buffer, overlay, measurements); [`suitability`] chains them into
//! the eight-step analysis that produces candidate school sites.

pub mod suitability;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::suitability::{
        compute_suitable_areas, BoundarySelector, CancelToken, PipelineStep, SuitabilityParams,
    };
    pub use crate::vector::{
        area, buffer_layer, buffer_point, clip_to_mask, extract_by_attribute, total_area,
        BufferParams, FilterOp,
    };
    pub use schoolsite_core::prelude::*;
}
