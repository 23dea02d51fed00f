//! GeoJSON geometry types.
//!
//! STAC items carry their footprint as a GeoJSON geometry in lon/lat order,
//! and ODC dataset documents carry the same footprint in the native CRS.
//! Positions are two-dimensional here; any altitude or measure values in
//! the input are dropped on parse.

use serde::{Deserialize, Serialize};

/// A single `[x, y]` position.
pub type Position = [f64; 2];

/// A linear ring (closed line string) of positions.
pub type Ring = Vec<Position>;

/// GeoJSON geometry types found in STAC item footprints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", try_from = "RawGeometry")]
pub enum Geometry {
    /// A point geometry.
    Point {
        /// Coordinates as [x, y].
        coordinates: Position,
    },

    /// A line string geometry.
    LineString {
        /// Array of [x, y] coordinate pairs.
        coordinates: Vec<Position>,
    },

    /// A polygon geometry.
    Polygon {
        /// Array of linear rings (first is exterior, rest are holes).
        coordinates: Vec<Ring>,
    },

    /// A collection of polygons.
    MultiPolygon {
        /// Array of polygons, each an array of linear rings.
        coordinates: Vec<Vec<Ring>>,
    },
}

/// Geometry as written in GeoJSON, positions of any dimension.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

fn position(raw: Vec<f64>) -> Result<Position, String> {
    match raw[..] {
        [x, y, ..] => Ok([x, y]),
        _ => Err(format!(
            "position needs at least 2 coordinates, got {}",
            raw.len()
        )),
    }
}

fn ring(raw: Vec<Vec<f64>>) -> Result<Ring, String> {
    raw.into_iter().map(position).collect()
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawGeometry::Point { coordinates } => Geometry::Point {
                coordinates: position(coordinates)?,
            },
            RawGeometry::LineString { coordinates } => Geometry::LineString {
                coordinates: ring(coordinates)?,
            },
            RawGeometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.into_iter().map(ring).collect::<Result<_, _>>()?,
            },
            RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .into_iter()
                    .map(|polygon| polygon.into_iter().map(ring).collect::<Result<_, _>>())
                    .collect::<Result<_, _>>()?,
            },
        })
    }
}

impl Geometry {
    /// Create a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coordinates: [x, y],
        }
    }

    /// Create a polygon geometry.
    pub fn polygon(coordinates: Vec<Ring>) -> Self {
        Geometry::Polygon { coordinates }
    }

    /// Create a multi-polygon geometry.
    pub fn multi_polygon(coordinates: Vec<Vec<Ring>>) -> Self {
        Geometry::MultiPolygon { coordinates }
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Total number of positions across all parts.
    pub fn num_positions(&self) -> usize {
        match self {
            Geometry::Point { .. } => 1,
            Geometry::LineString { coordinates } => coordinates.len(),
            Geometry::Polygon { coordinates } => coordinates.iter().map(Vec::len).sum(),
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flat_map(|polygon| polygon.iter())
                .map(Vec::len)
                .sum(),
        }
    }

    /// Apply a fallible function to every position, preserving structure.
    pub fn try_map_positions<E, F>(&self, mut f: F) -> Result<Geometry, E>
    where
        F: FnMut(Position) -> Result<Position, E>,
    {
        if let Geometry::Point { coordinates } = self {
            return Ok(Geometry::Point {
                coordinates: f(*coordinates)?,
            });
        }

        let mut map_ring = |ring: &Ring| -> Result<Ring, E> { ring.iter().map(|p| f(*p)).collect() };

        Ok(match self {
            Geometry::Point { .. } => unreachable!("handled above"),
            Geometry::LineString { coordinates } => Geometry::LineString {
                coordinates: map_ring(coordinates)?,
            },
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.iter().map(&mut map_ring).collect::<Result<_, _>>()?,
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|polygon| polygon.iter().map(&mut map_ring).collect::<Result<_, _>>())
                    .collect::<Result<_, _>>()?,
            },
        })
    }
}
