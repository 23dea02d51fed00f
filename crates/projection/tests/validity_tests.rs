//! Validity checks for geometries before and after reprojection.

use odc_common::{CrsCode, Geometry};
use projection::{is_valid, reproject_geometry, validate, InvalidGeometry};
use test_utils::fixtures::footprint;

// ============================================================================
// Valid geometries
// ============================================================================

#[test]
fn test_square_is_valid() {
    assert_eq!(validate(&footprint::square(14.0, 49.0, 1.0)), Ok(()));
}

#[test]
fn test_clockwise_square_is_valid() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [1.0, 0.0],
        [0.0, 0.0],
    ]]);
    assert!(is_valid(&geometry));
}

#[test]
fn test_square_with_hole_is_valid() {
    assert_eq!(validate(&footprint::square_with_hole(0.0, 0.0, 4.0)), Ok(()));
}

#[test]
fn test_repeated_vertices_are_tolerated() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.0, 0.0],
    ]]);
    assert!(is_valid(&geometry));
}

#[test]
fn test_collinear_vertex_on_edge_is_valid() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [2.0, 0.0],
        [2.0, 2.0],
        [0.0, 2.0],
        [0.0, 0.0],
    ]]);
    assert!(is_valid(&geometry));
}

#[test]
fn test_disjoint_multi_polygon_is_valid() {
    let geometry = Geometry::multi_polygon(vec![
        vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        vec![vec![[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]],
    ]);
    assert!(is_valid(&geometry));
}

#[test]
fn test_hole_touching_shell_at_vertex_is_valid() {
    let geometry = Geometry::polygon(vec![
        vec![[16.0, 49.0], [18.0, 49.0], [18.0, 51.0], [16.0, 51.0], [16.0, 49.0]],
        vec![[16.0, 49.0], [16.5, 50.0], [17.0, 49.5], [16.0, 49.0]],
    ]);
    assert_eq!(validate(&geometry), Ok(()));
}

#[test]
fn test_hole_vertex_on_shell_edge_is_valid() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
        vec![[2.0, 0.0], [3.0, 1.0], [1.0, 1.0], [2.0, 0.0]],
    ]);
    assert_eq!(validate(&geometry), Ok(()));
}

#[test]
fn test_holes_touching_at_vertex_are_valid() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
        vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
        vec![[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]],
    ]);
    assert_eq!(validate(&geometry), Ok(()));
}

#[test]
fn test_multi_polygon_touching_at_corner_is_valid() {
    let geometry = Geometry::multi_polygon(vec![
        vec![vec![[16.0, 49.0], [17.0, 49.0], [17.0, 50.0], [16.0, 50.0], [16.0, 49.0]]],
        vec![vec![[17.0, 50.0], [18.0, 50.0], [18.0, 51.0], [17.0, 51.0], [17.0, 50.0]]],
    ]);
    assert_eq!(validate(&geometry), Ok(()));
}

#[test]
fn test_multi_polygon_inside_hole_is_valid() {
    let geometry = Geometry::multi_polygon(vec![
        vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0], [1.0, 1.0]],
        ],
        vec![vec![[1.0, 1.0], [2.0, 1.5], [1.5, 2.0], [1.0, 1.0]]],
    ]);
    assert_eq!(validate(&geometry), Ok(()));
}

#[test]
fn test_point_and_line_validity() {
    assert!(is_valid(&Geometry::point(1.0, 2.0)));
    assert!(!is_valid(&Geometry::point(f64::NAN, 2.0)));
    assert!(is_valid(&Geometry::LineString {
        coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
    }));
    assert!(!is_valid(&Geometry::LineString {
        coordinates: vec![[0.0, 0.0], [0.0, 0.0]],
    }));
}

// ============================================================================
// Invalid geometries
// ============================================================================

#[test]
fn test_bowtie_is_self_intersecting() {
    assert_eq!(
        validate(&footprint::bowtie(0.0, 0.0, 4.0)),
        Err(InvalidGeometry::SelfIntersection)
    );
}

#[test]
fn test_sliver_has_zero_area() {
    assert_eq!(
        validate(&footprint::sliver(0.0, 0.0, 1.0)),
        Err(InvalidGeometry::ZeroArea)
    );
}

#[test]
fn test_unclosed_ring() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
    ]]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::UnclosedRing));
}

#[test]
fn test_too_few_positions() {
    let geometry = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]);
    assert_eq!(
        validate(&geometry),
        Err(InvalidGeometry::TooFewPositions { positions: 3 })
    );
}

#[test]
fn test_all_vertices_identical() {
    let geometry = Geometry::polygon(vec![vec![[1.0, 1.0]; 5]]);
    assert!(matches!(
        validate(&geometry),
        Err(InvalidGeometry::TooFewPositions { .. })
    ));
}

#[test]
fn test_empty_polygon() {
    assert_eq!(
        validate(&Geometry::polygon(vec![])),
        Err(InvalidGeometry::Empty)
    );
}

#[test]
fn test_spike_is_self_intersecting() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 2.0],
        [2.0, 3.0],
        [2.0, 2.5],
        [0.0, 2.0],
        [0.0, 0.0],
    ]]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::SelfIntersection));
}

#[test]
fn test_hole_outside_shell() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::HoleOutsideShell));
}

#[test]
fn test_hole_crossing_shell() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
        vec![[1.0, 1.0], [6.0, 1.0], [6.0, 3.0], [1.0, 1.0]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::RingsIntersect));
}

#[test]
fn test_overlapping_multi_polygon() {
    let geometry = Geometry::multi_polygon(vec![
        vec![vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]],
        vec![vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::PolygonsOverlap));
}

#[test]
fn test_hole_touching_shell_twice() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
        vec![[0.0, 0.0], [2.0, 1.0], [4.0, 0.0], [2.0, 3.0], [0.0, 0.0]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::RingsIntersect));
}

#[test]
fn test_hole_leaving_shell_through_vertices() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
        vec![[2.0, 2.0], [6.0, 6.0], [6.0, -2.0], [2.0, 2.0]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::RingsIntersect));
}

#[test]
fn test_nested_holes() {
    let geometry = Geometry::polygon(vec![
        vec![[0.0, 0.0], [8.0, 0.0], [8.0, 8.0], [0.0, 8.0], [0.0, 0.0]],
        vec![[1.0, 1.0], [7.0, 1.0], [7.0, 7.0], [1.0, 7.0], [1.0, 1.0]],
        vec![[3.0, 3.0], [4.0, 3.0], [4.0, 4.0], [3.0, 3.0]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::NestedHoles));
}

#[test]
fn test_multi_polygon_sharing_edge() {
    let geometry = Geometry::multi_polygon(vec![
        vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
        vec![vec![[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::PolygonsOverlap));
}

#[test]
fn test_multi_polygon_touching_from_inside() {
    let geometry = Geometry::multi_polygon(vec![
        vec![vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]]],
        vec![vec![[0.0, 0.0], [2.0, 1.0], [1.0, 2.0], [0.0, 0.0]]],
    ]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::PolygonsOverlap));
}

#[test]
fn test_non_finite_coordinate() {
    let geometry = Geometry::polygon(vec![vec![
        [0.0, 0.0],
        [f64::INFINITY, 0.0],
        [1.0, 1.0],
        [0.0, 0.0],
    ]]);
    assert_eq!(validate(&geometry), Err(InvalidGeometry::NonFinite));
}

// ============================================================================
// Reproject then validate
// ============================================================================

#[test]
fn test_reprojected_square_stays_valid() {
    let geometry = footprint::square(16.4, 49.6, 1.0);
    let projected = reproject_geometry(&geometry, CrsCode::UtmNorth(33)).unwrap();
    assert!(is_valid(&projected));
}

#[test]
fn test_reprojected_bowtie_stays_invalid() {
    let geometry = footprint::bowtie(16.4, 49.6, 1.0);
    let projected = reproject_geometry(&geometry, CrsCode::UtmNorth(33)).unwrap();
    assert!(!is_valid(&projected));
}

#[test]
fn test_reprojected_southern_square_is_valid() {
    let geometry = footprint::square(150.5, -34.0, 0.5);
    let projected = reproject_geometry(&geometry, CrsCode::UtmSouth(56)).unwrap();
    assert!(is_valid(&projected));
}
