//! Topological validity checks for projected geometries.
//!
//! Follows the OGC simple-features rules that matter for dataset footprints:
//! rings are closed, have at least three distinct vertices, enclose a
//! non-zero area and never cross or touch themselves; holes lie inside their
//! shell and rings of a polygon do not intersect; polygons of a
//! multi-polygon do not overlap.
//!
//! Distinct rings may touch at isolated points. A hole may touch its shell
//! or another hole at one point at most, since a second contact would split
//! the polygon interior. Polygons of a multi-polygon may touch at any number
//! of points but never share an edge.

use odc_common::{Geometry, Position, Ring};
use thiserror::Error;

/// Relative tolerance used to decide a ring is degenerate.
const AREA_EPSILON: f64 = 1e-12;

/// Reason a geometry failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGeometry {
    #[error("geometry has no parts")]
    Empty,

    #[error("too few distinct positions ({positions})")]
    TooFewPositions { positions: usize },

    #[error("coordinate is not finite")]
    NonFinite,

    #[error("ring is not closed")]
    UnclosedRing,

    #[error("ring encloses zero area")]
    ZeroArea,

    #[error("ring self-intersection")]
    SelfIntersection,

    #[error("rings of a polygon intersect")]
    RingsIntersect,

    #[error("hole lies outside its shell")]
    HoleOutsideShell,

    #[error("hole is nested inside another hole")]
    NestedHoles,

    #[error("polygons of a multi-polygon overlap")]
    PolygonsOverlap,
}

/// Check a geometry for topological validity.
pub fn validate(geometry: &Geometry) -> Result<(), InvalidGeometry> {
    match geometry {
        Geometry::Point { coordinates } => check_finite(coordinates),
        Geometry::LineString { coordinates } => {
            coordinates.iter().try_for_each(check_finite)?;
            let distinct = dedup_consecutive(coordinates).len();
            if distinct < 2 {
                return Err(InvalidGeometry::TooFewPositions { positions: distinct });
            }
            Ok(())
        }
        Geometry::Polygon { coordinates } => validate_polygon(coordinates).map(|_| ()),
        Geometry::MultiPolygon { coordinates } => {
            if coordinates.is_empty() {
                return Err(InvalidGeometry::Empty);
            }
            let polygons = coordinates
                .iter()
                .map(|rings| validate_polygon(rings))
                .collect::<Result<Vec<_>, _>>()?;

            for (i, a) in polygons.iter().enumerate() {
                for b in &polygons[i + 1..] {
                    if polygons_overlap(a, b) {
                        return Err(InvalidGeometry::PolygonsOverlap);
                    }
                }
            }
            Ok(())
        }
    }
}

/// Convenience wrapper around [`validate`].
pub fn is_valid(geometry: &Geometry) -> bool {
    validate(geometry).is_ok()
}

/// Validate a polygon and return its rings as open vertex lists.
fn validate_polygon(rings: &[Ring]) -> Result<Vec<Vec<Position>>, InvalidGeometry> {
    if rings.is_empty() {
        return Err(InvalidGeometry::Empty);
    }

    let rings = rings
        .iter()
        .map(|ring| validate_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;

    let (shell, holes) = rings.split_first().ok_or(InvalidGeometry::Empty)?;
    for hole in holes {
        match relate(hole, shell) {
            Relation::Sides { inside: false, .. } => return Err(InvalidGeometry::HoleOutsideShell),
            Relation::Sides {
                touches: 0 | 1,
                outside: false,
                ..
            } => {}
            _ => return Err(InvalidGeometry::RingsIntersect),
        }
    }

    for (i, a) in holes.iter().enumerate() {
        for b in &holes[i + 1..] {
            for relation in [relate(b, a), relate(a, b)] {
                match relation {
                    Relation::Sides {
                        touches: 0 | 1,
                        inside: false,
                        ..
                    } => {}
                    Relation::Sides {
                        touches: 0 | 1,
                        outside: false,
                        ..
                    } => return Err(InvalidGeometry::NestedHoles),
                    _ => return Err(InvalidGeometry::RingsIntersect),
                }
            }
        }
    }

    Ok(rings)
}

/// Validate a single closed ring, returning its distinct vertices (open form).
fn validate_ring(ring: &Ring) -> Result<Vec<Position>, InvalidGeometry> {
    if ring.len() < 4 {
        return Err(InvalidGeometry::TooFewPositions {
            positions: ring.len(),
        });
    }
    ring.iter().try_for_each(check_finite)?;

    if ring.first() != ring.last() {
        return Err(InvalidGeometry::UnclosedRing);
    }

    let mut vertices = dedup_consecutive(&ring[..ring.len() - 1]);
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(InvalidGeometry::TooFewPositions {
            positions: vertices.len(),
        });
    }

    let scale = extent(&vertices);
    if scale == 0.0 || signed_area(&vertices).abs() <= AREA_EPSILON * scale * scale {
        return Err(InvalidGeometry::ZeroArea);
    }

    if ring_self_intersects(&vertices) {
        return Err(InvalidGeometry::SelfIntersection);
    }

    Ok(vertices)
}

fn check_finite(p: &Position) -> Result<(), InvalidGeometry> {
    if p[0].is_finite() && p[1].is_finite() {
        Ok(())
    } else {
        Err(InvalidGeometry::NonFinite)
    }
}

fn dedup_consecutive(positions: &[Position]) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::with_capacity(positions.len());
    for p in positions {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    out
}

/// Larger side of the bounding box.
fn extent(vertices: &[Position]) -> f64 {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for [x, y] in vertices {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Shoelace area of an open vertex list (positive when counter-clockwise).
fn signed_area(vertices: &[Position]) -> f64 {
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let [x1, y1] = vertices[i];
            let [x2, y2] = vertices[(i + 1) % n];
            x1 * y2 - x2 * y1
        })
        .sum();
    twice / 2.0
}

fn segments(vertices: &[Position]) -> impl Iterator<Item = (Position, Position)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

fn ring_self_intersects(vertices: &[Position]) -> bool {
    let n = vertices.len();
    let segs: Vec<_> = segments(vertices).collect();

    for i in 0..n {
        for j in i + 1..n {
            let (a1, a2) = segs[i];
            let (b1, b2) = segs[j];
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);

            if adjacent {
                // Adjacent edges share one vertex; they may only meet there.
                let (shared, a_far, b_far) = if j == i + 1 { (a2, a1, b2) } else { (a1, a2, b1) };
                debug_assert!(shared == b1 || shared == b2);
                if orientation(a_far, shared, b_far) == 0.0
                    && (on_segment(shared, b_far, a_far) || on_segment(shared, a_far, b_far))
                {
                    return true;
                }
            } else if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// How the boundary of one ring sits relative to another ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    /// The boundaries cross or share a stretch of edge.
    Crosses,
    /// The boundaries meet at `touches` isolated points; `inside` and
    /// `outside` tell which sides of the other ring the rest of the
    /// boundary visits.
    Sides {
        touches: usize,
        inside: bool,
        outside: bool,
    },
}

impl Relation {
    fn is_inside_only(&self) -> bool {
        matches!(
            self,
            Relation::Sides {
                inside: true,
                outside: false,
                ..
            }
        )
    }
}

/// Contact between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SegmentContact {
    Cross,
    Touch(Position),
}

/// Relate the boundary of ring `b` to ring `a`.
fn relate(b: &[Position], a: &[Position]) -> Relation {
    let mut touches: Vec<Position> = Vec::new();
    for (a1, a2) in segments(a) {
        for (b1, b2) in segments(b) {
            match segment_contact(a1, a2, b1, b2) {
                Some(SegmentContact::Cross) => return Relation::Crosses,
                Some(SegmentContact::Touch(p)) if !touches.contains(&p) => touches.push(p),
                _ => {}
            }
        }
    }

    let mut inside = false;
    let mut outside = false;
    for (b1, b2) in segments(b) {
        // Split the edge at contact points and classify each piece by its midpoint.
        let mut cuts = vec![0.0, 1.0];
        cuts.extend(
            touches
                .iter()
                .filter(|t| orientation(b1, b2, **t) == 0.0 && on_segment(b1, b2, **t))
                .map(|t| segment_param(b1, b2, *t)),
        );
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();

        for pair in cuts.windows(2) {
            let m = (pair[0] + pair[1]) / 2.0;
            let mid = [b1[0] + m * (b2[0] - b1[0]), b1[1] + m * (b2[1] - b1[1])];
            if point_in_ring(mid, a) {
                inside = true;
            } else {
                outside = true;
            }
        }
    }

    Relation::Sides {
        touches: touches.len(),
        inside,
        outside,
    }
}

/// Position of `p` along segment `a`-`b` as a fraction of its length.
fn segment_param(a: Position, b: Position, p: Position) -> f64 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    if dx.abs() >= dy.abs() {
        (p[0] - a[0]) / dx
    } else {
        (p[1] - a[1]) / dy
    }
}

fn polygons_overlap(a: &[Vec<Position>], b: &[Vec<Position>]) -> bool {
    let crossing = a
        .iter()
        .any(|ring_a| b.iter().any(|ring_b| relate(ring_b, ring_a) == Relation::Crosses));
    if crossing {
        return true;
    }
    shell_overlaps(&a[0], b) || shell_overlaps(&b[0], a)
}

/// Whether `shell` reaches into the interior of `polygon`.
fn shell_overlaps(shell: &[Position], polygon: &[Vec<Position>]) -> bool {
    let (other_shell, holes) = match polygon.split_first() {
        Some(split) => split,
        None => return false,
    };
    match relate(shell, other_shell) {
        Relation::Crosses => true,
        Relation::Sides { inside: false, .. } => false,
        Relation::Sides { outside: true, .. } => true,
        Relation::Sides { .. } => !holes.iter().any(|hole| relate(shell, hole).is_inside_only()),
    }
}

/// Even-odd ray casting test.
fn point_in_ring(p: Position, vertices: &[Position]) -> bool {
    let [px, py] = p;
    let mut inside = false;
    for ([x1, y1], [x2, y2]) in segments(vertices) {
        if (y1 > py) != (y2 > py) {
            let x_cross = x1 + (py - y1) * (x2 - x1) / (y2 - y1);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Cross product of (b - a) × (c - a).
fn orientation(a: Position, b: Position, c: Position) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Whether `p` lies within the bounding box of segment `a`-`b`.
///
/// Only meaningful when the three points are collinear.
fn on_segment(a: Position, b: Position, p: Position) -> bool {
    p[0] >= a[0].min(b[0]) && p[0] <= a[0].max(b[0]) && p[1] >= a[1].min(b[1]) && p[1] <= a[1].max(b[1])
}

/// Segment intersection test including touching and collinear overlap.
fn segments_intersect(p1: Position, p2: Position, q1: Position, q2: Position) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Classify the contact between segments `p1`-`p2` and `q1`-`q2`.
///
/// Collinear segments sharing more than a point count as crossing.
fn segment_contact(p1: Position, p2: Position, q1: Position, q2: Position) -> Option<SegmentContact> {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return Some(SegmentContact::Cross);
    }

    let mut shared: Vec<Position> = Vec::with_capacity(2);
    let candidates = [
        (d1, q1, q2, p1),
        (d2, q1, q2, p2),
        (d3, p1, p2, q1),
        (d4, p1, p2, q2),
    ];
    for (d, a, b, p) in candidates {
        if d == 0.0 && on_segment(a, b, p) && !shared.contains(&p) {
            shared.push(p);
        }
    }

    match shared.as_slice() {
        [] => None,
        [p] => Some(SegmentContact::Touch(*p)),
        _ => Some(SegmentContact::Cross),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert_eq!(signed_area(&ccw), 4.0);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_eq!(signed_area(&cw), -4.0);
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect([0.0, 0.0], [2.0, 2.0], [0.0, 2.0], [2.0, 0.0]));
        assert!(!segments_intersect([0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]));
        // Touching at an endpoint
        assert!(segments_intersect([0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0]));
        // Collinear overlap
        assert!(segments_intersect([0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [3.0, 0.0]));
        // Collinear but disjoint
        assert!(!segments_intersect([0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]));
    }

    #[test]
    fn test_segment_contact() {
        assert_eq!(
            segment_contact([0.0, 0.0], [2.0, 2.0], [0.0, 2.0], [2.0, 0.0]),
            Some(SegmentContact::Cross)
        );
        assert_eq!(
            segment_contact([0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0]),
            Some(SegmentContact::Touch([1.0, 0.0]))
        );
        // Vertex on the interior of the other segment
        assert_eq!(
            segment_contact([0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [1.0, 1.0]),
            Some(SegmentContact::Touch([1.0, 0.0]))
        );
        // Collinear, end to end
        assert_eq!(
            segment_contact([0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [2.0, 0.0]),
            Some(SegmentContact::Touch([1.0, 0.0]))
        );
        // Collinear overlap
        assert_eq!(
            segment_contact([0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [3.0, 0.0]),
            Some(SegmentContact::Cross)
        );
        assert_eq!(segment_contact([0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]), None);
    }

    #[test]
    fn test_relate_touching_triangle() {
        let square = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
        let inner = [[0.0, 0.0], [2.0, 1.0], [1.0, 2.0]];
        assert_eq!(
            relate(&inner, &square),
            Relation::Sides {
                touches: 1,
                inside: true,
                outside: false
            }
        );
        let outer = [[4.0, 4.0], [5.0, 4.0], [5.0, 5.0]];
        assert_eq!(
            relate(&outer, &square),
            Relation::Sides {
                touches: 1,
                inside: false,
                outside: true
            }
        );
    }

    #[test]
    fn test_point_in_ring() {
        let square = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
        assert!(point_in_ring([2.0, 2.0], &square));
        assert!(!point_in_ring([5.0, 2.0], &square));
    }

    #[test]
    fn test_dedup_consecutive() {
        let positions = [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        assert_eq!(dedup_consecutive(&positions).len(), 3);
    }
}
