//! Footprint reprojection into the native CRS of the item.

use odc_common::{CrsCode, Geometry};
use projection::{reproject_geometry, validate, InvalidGeometry, ProjectionError};
use std::fmt;
use tracing::info;

/// Why an item's footprint was left out of its dataset document.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDrop {
    /// The item has no geometry.
    Missing,
    /// No projection is available for the target CRS.
    UnsupportedCrs(u32),
    /// A vertex could not be projected.
    OutOfDomain { lon: f64, lat: f64 },
    /// The reprojected geometry is not topologically valid.
    Invalid(InvalidGeometry),
}

impl fmt::Display for GeometryDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryDrop::Missing => write!(f, "item has no geometry"),
            GeometryDrop::UnsupportedCrs(code) => {
                write!(f, "no projection available for EPSG:{}", code)
            }
            GeometryDrop::OutOfDomain { lon, lat } => {
                write!(f, "position ({}, {}) cannot be projected", lon, lat)
            }
            GeometryDrop::Invalid(reason) => write!(f, "invalid geometry: {}", reason),
        }
    }
}

impl From<ProjectionError> for GeometryDrop {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::UnsupportedCrs(code) => GeometryDrop::UnsupportedCrs(code),
            ProjectionError::InvalidUtmZone(zone) => {
                GeometryDrop::UnsupportedCrs(CrsCode::UtmNorth(zone).epsg())
            }
            ProjectionError::OutOfDomain { lon, lat } => GeometryDrop::OutOfDomain { lon, lat },
        }
    }
}

/// Reproject a lon/lat footprint into `crs` and keep it only if valid.
pub fn native_footprint(
    geometry: Option<&Geometry>,
    crs: CrsCode,
) -> Result<Geometry, GeometryDrop> {
    let geometry = geometry.ok_or(GeometryDrop::Missing)?;
    let projected = reproject_geometry(geometry, crs)?;
    validate(&projected).map_err(GeometryDrop::Invalid)?;
    Ok(projected)
}

/// Like [`native_footprint`], logging the reason when the footprint is dropped.
pub fn reproject_footprint(
    item_id: &str,
    geometry: Option<&Geometry>,
    crs: CrsCode,
) -> Result<Geometry, GeometryDrop> {
    native_footprint(geometry, crs).map_err(|drop| {
        info!(item = %item_id, crs = %crs, reason = %drop, "Dropping footprint geometry");
        drop
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::footprint;

    #[test]
    fn test_valid_footprint_reprojected() {
        let geometry = footprint::square(16.4, 49.6, 1.0);
        let projected = native_footprint(Some(&geometry), CrsCode::UtmNorth(33)).unwrap();
        assert_eq!(projected.type_name(), "Polygon");
        assert_eq!(projected.num_positions(), 5);
    }

    #[test]
    fn test_missing_geometry() {
        assert_eq!(
            native_footprint(None, CrsCode::UtmNorth(33)),
            Err(GeometryDrop::Missing)
        );
    }

    #[test]
    fn test_unsupported_crs() {
        let geometry = footprint::square(16.4, 49.6, 1.0);
        assert_eq!(
            native_footprint(Some(&geometry), CrsCode::Other(2154)),
            Err(GeometryDrop::UnsupportedCrs(2154))
        );
    }

    #[test]
    fn test_invalid_after_reprojection() {
        let geometry = footprint::bowtie(16.4, 49.6, 1.0);
        assert_eq!(
            native_footprint(Some(&geometry), CrsCode::UtmNorth(33)),
            Err(GeometryDrop::Invalid(InvalidGeometry::SelfIntersection))
        );
    }

    #[test]
    fn test_geographic_target_is_identity() {
        let geometry = footprint::square(16.4, 49.6, 1.0);
        let projected = native_footprint(Some(&geometry), CrsCode::Epsg4326).unwrap();
        assert_eq!(projected, geometry);
    }
}
