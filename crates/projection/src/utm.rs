//! Universal Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Uses the Krüger series in the third flattening `n`, truncated after the
//! third order. Within a UTM zone this is accurate to well below a millimetre.
//!
//! The projection parameters are:
//! - Central meridian (lon0): middle of the 6° zone
//! - Scale factor on the central meridian (k0): 0.9996
//! - False easting: 500 000 m
//! - False northing: 0 m (north) or 10 000 000 m (south)

use std::f64::consts::PI;

use crate::ProjectionError;

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Rectifying radius scaled by k0
    k0_a: f64,
    /// First eccentricity
    e: f64,
    /// Forward series coefficients
    alpha: [f64; 3],
    /// Inverse series coefficients
    beta: [f64; 3],
    /// Conformal-to-geodetic latitude coefficients
    delta: [f64; 3],
}

impl TransverseMercator {
    /// Create a transverse Mercator projection on WGS84.
    ///
    /// # Arguments
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `k0` - Scale factor on the central meridian
    /// * `false_easting` - Added to eastings (meters)
    /// * `false_northing` - Added to northings (meters)
    pub fn new(lon0_deg: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;

        // Rectifying radius
        let a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
            n2 / 48.0 + n3 / 15.0,
            17.0 * n3 / 480.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
            56.0 * n3 / 15.0,
        ];

        Self {
            lon0: lon0_deg.to_radians(),
            k0,
            false_easting,
            false_northing,
            k0_a: k0 * a,
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha,
            beta,
            delta,
        }
    }

    /// Create the projection for a WGS84 UTM zone.
    ///
    /// Zones are numbered 1..=60, each 6° wide starting at 180°W.
    pub fn utm(zone: u8, north: bool) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidUtmZone(zone));
        }
        let lon0 = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        Ok(Self::new(lon0, UTM_K0, UTM_FALSE_EASTING, false_northing))
    }

    /// Convert geographic coordinates (degrees) to easting/northing (meters).
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjectionError> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() || lat_deg.abs() > 90.0 {
            return Err(ProjectionError::OutOfDomain {
                lon: lon_deg,
                lat: lat_deg,
            });
        }

        let phi = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        // The series diverges on the far side of the globe
        if dlon.abs() >= PI / 2.0 {
            return Err(ProjectionError::OutOfDomain {
                lon: lon_deg,
                lat: lat_deg,
            });
        }

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlon.cos());
        let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let easting = self.false_easting + self.k0_a * eta;
        let northing = self.false_northing + self.k0_a * xi;

        if !easting.is_finite() || !northing.is_finite() {
            return Err(ProjectionError::OutOfDomain {
                lon: lon_deg,
                lat: lat_deg,
            });
        }

        Ok((easting, northing))
    }

    /// Convert easting/northing (meters) back to geographic coordinates.
    ///
    /// Returns (lon, lat) in degrees.
    pub fn unproject(&self, easting: f64, northing: f64) -> (f64, f64) {
        let xi = (northing - self.false_northing) / self.k0_a;
        let eta = (easting - self.false_easting) / self.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += delta * (k * chi).sin();
        }

        let lon = self.lon0 + eta_p.sinh().atan2(xi_p.cos());

        (normalize_angle(lon).to_degrees(), phi.to_degrees())
    }
}

/// Normalize an angle in radians to [-π, π].
fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
