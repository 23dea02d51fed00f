//! Coordinate Reference System codes.
//!
//! Datasets carry their native CRS as a bare EPSG code (`proj:epsg` in STAC,
//! `epsg:<code>` in ODC documents). Only the families the projection crate
//! can handle analytically get their own variant; everything else is kept
//! as [`CrsCode::Other`] so it still round-trips through documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code range for WGS84 / UTM north zones (32601..=32660).
const UTM_NORTH_BASE: u32 = 32600;
/// EPSG code range for WGS84 / UTM south zones (32701..=32760).
const UTM_SOUTH_BASE: u32 = 32700;

/// Well-known CRS codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 / UTM zone N (northern hemisphere)
    UtmNorth(u8),
    /// WGS84 / UTM zone S (southern hemisphere)
    UtmSouth(u8),
    /// Any other EPSG code
    Other(u32),
}

impl CrsCode {
    /// Classify a numeric EPSG code.
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 => CrsCode::Epsg4326,
            3857 => CrsCode::Epsg3857,
            c if (UTM_NORTH_BASE + 1..=UTM_NORTH_BASE + 60).contains(&c) => {
                CrsCode::UtmNorth((c - UTM_NORTH_BASE) as u8)
            }
            c if (UTM_SOUTH_BASE + 1..=UTM_SOUTH_BASE + 60).contains(&c) => {
                CrsCode::UtmSouth((c - UTM_SOUTH_BASE) as u8)
            }
            c => CrsCode::Other(c),
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match *self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg3857 => 3857,
            CrsCode::UtmNorth(zone) => UTM_NORTH_BASE + zone as u32,
            CrsCode::UtmSouth(zone) => UTM_SOUTH_BASE + zone as u32,
            CrsCode::Other(code) => code,
        }
    }

    /// Lower-case form used in ODC dataset documents, e.g. `epsg:32633`.
    pub fn odc_string(&self) -> String {
        format!("epsg:{}", self.epsg())
    }
}

impl From<u32> for CrsCode {
    fn from(code: u32) -> Self {
        CrsCode::from_epsg(code)
    }
}

impl From<CrsCode> for u32 {
    fn from(crs: CrsCode) -> Self {
        crs.epsg()
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
