//! Geographic → native CRS transforms for whole geometries.

use odc_common::{CrsCode, Geometry};

use crate::utm::TransverseMercator;
use crate::{mercator, ProjectionError};

/// A forward projection from WGS84 lon/lat into a target CRS.
#[derive(Debug, Clone)]
pub enum Projector {
    /// Target is EPSG:4326 already
    Identity,
    /// EPSG:3857
    WebMercator,
    /// WGS84 / UTM
    Utm(TransverseMercator),
}

impl Projector {
    /// Build the projector for a target CRS.
    pub fn for_crs(crs: CrsCode) -> Result<Self, ProjectionError> {
        match crs {
            CrsCode::Epsg4326 => Ok(Projector::Identity),
            CrsCode::Epsg3857 => Ok(Projector::WebMercator),
            CrsCode::UtmNorth(zone) => Ok(Projector::Utm(TransverseMercator::utm(zone, true)?)),
            CrsCode::UtmSouth(zone) => Ok(Projector::Utm(TransverseMercator::utm(zone, false)?)),
            CrsCode::Other(code) => Err(ProjectionError::UnsupportedCrs(code)),
        }
    }

    /// Project a single lon/lat position.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<[f64; 2], ProjectionError> {
        let (x, y) = match self {
            Projector::Identity => {
                if !lon.is_finite() || !lat.is_finite() {
                    return Err(ProjectionError::OutOfDomain { lon, lat });
                }
                (lon, lat)
            }
            Projector::WebMercator => mercator::project(lon, lat)?,
            Projector::Utm(tm) => tm.project(lon, lat)?,
        };
        Ok([x, y])
    }

    /// Project every vertex of a lon/lat geometry.
    ///
    /// Edges are not densified: each vertex maps exactly and the straight
    /// segments between them are kept as they are.
    pub fn forward_geometry(&self, geometry: &Geometry) -> Result<Geometry, ProjectionError> {
        geometry.try_map_positions(|[lon, lat]| self.forward(lon, lat))
    }
}

/// Reproject a lon/lat geometry into `crs`.
pub fn reproject_geometry(geometry: &Geometry, crs: CrsCode) -> Result<Geometry, ProjectionError> {
    Projector::for_crs(crs)?.forward_geometry(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::polygon(vec![vec![
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat],
        ]])
    }

    #[test]
    fn test_identity_keeps_coordinates() {
        let geometry = square(14.0, 49.0, 1.0);
        let out = reproject_geometry(&geometry, CrsCode::Epsg4326).unwrap();
        assert_eq!(out, geometry);
    }

    #[test]
    fn test_utm_keeps_structure() {
        let geometry = square(14.5, 49.5, 0.5);
        let out = reproject_geometry(&geometry, CrsCode::UtmNorth(33)).unwrap();
        match out {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates[0].len(), 5);
                assert_eq!(coordinates[0][0], coordinates[0][4]);
                let [e, n] = coordinates[0][0];
                assert!((400_000.0..500_000.0).contains(&e), "easting {}", e);
                assert!((5_400_000.0..5_500_000.0).contains(&n), "northing {}", n);
            }
            other => panic!("expected polygon, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_unsupported_crs() {
        let result = reproject_geometry(&square(0.0, 0.0, 1.0), CrsCode::Other(3577));
        assert!(matches!(result, Err(ProjectionError::UnsupportedCrs(3577))));
    }

    #[test]
    fn test_out_of_domain_vertex_fails_whole_geometry() {
        let result = reproject_geometry(&square(-170.0, 10.0, 1.0), CrsCode::UtmNorth(33));
        assert!(matches!(result, Err(ProjectionError::OutOfDomain { .. })));
    }
}
