//! Vector analysis operations
//!
//! Geometric and attribute operations on vector layers:
//! - Extract by attribute: keep features satisfying a comparison
//! - Clip: restrict geometries to a polygon mask
//! - Buffer: expand geometries into exclusion zones, dissolved
//! - Overlay: union / intersection / difference of polygon sets
//! - Area: geometric measurement

mod buffer;
mod clip;
mod filter;
mod measurements;
pub mod overlay;

pub use buffer::{buffer_layer, buffer_point, BufferParams};
pub use clip::clip_to_mask;
pub use filter::{extract_by_attribute, FilterOp};
pub use measurements::{area, total_area};
