//! Common types shared across the STAC to ODC indexing crates.

pub mod crs;
pub mod geojson;

pub use crs::CrsCode;
pub use geojson::{Geometry, Position, Ring};
