//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies,
//! plus the geometry validity checks applied after reprojection.

pub mod mercator;
pub mod transform;
pub mod utm;
pub mod validity;

pub use transform::{reproject_geometry, Projector};
pub use utm::TransverseMercator;
pub use validity::{is_valid, validate, InvalidGeometry};

use thiserror::Error;

/// Errors raised while projecting coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("no projection available for EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("invalid UTM zone: {0}")]
    InvalidUtmZone(u8),

    #[error("position ({lon}, {lat}) is outside the projection domain")]
    OutOfDomain { lon: f64, lat: f64 },
}
