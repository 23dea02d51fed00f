//! Spherical (Web) Mercator projection, EPSG:3857.

use std::f64::consts::PI;

use crate::utm::WGS84_A;
use crate::ProjectionError;

/// Latitude limit of the square Web Mercator world (degrees).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project lon/lat (degrees) to Web Mercator meters.
pub fn project(lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjectionError> {
    if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > MAX_LATITUDE {
        return Err(ProjectionError::OutOfDomain {
            lon: lon_deg,
            lat: lat_deg,
        });
    }

    let x = WGS84_A * lon_deg.to_radians();
    let y = WGS84_A * (PI / 4.0 + lat_deg.to_radians() / 2.0).tan().ln();
    Ok((x, y))
}

/// Inverse of [`project`], returning (lon, lat) in degrees.
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}
