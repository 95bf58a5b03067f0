//! Tests for zonal footprint validation.

use ndvi_common::{Footprint, LonLat, NdviError};
use serde_json::json;

// ============================================================================
// Valid rings
// ============================================================================

#[test]
fn test_footprint_from_json_valid() {
    let value = json!([
        [7.464334235846994, 51.36640233387978],
        [7.466235210810565, 51.36640233387978],
        [7.466235210810565, 51.36751084196721],
        [7.464334235846994, 51.36751084196721],
        [7.464334235846994, 51.36640233387978]
    ]);

    let footprint = Footprint::from_json(&value).unwrap();
    let corners = footprint.corners();
    assert!((corners[1].lon - 7.466235210810565).abs() < 1e-12);
    assert!((corners[2].lat - 51.36751084196721).abs() < 1e-12);
}

#[test]
fn test_footprint_accepts_numeric_strings() {
    let value = json!([["0", "0"], ["1", "0"], ["1", "1"], ["0", "1"], ["0", "0"]]);
    assert!(Footprint::from_json(&value).is_ok());
}

#[test]
fn test_footprint_from_ring() {
    let ring = [
        LonLat::new(0.0, 0.0),
        LonLat::new(1.0, 0.0),
        LonLat::new(1.0, 1.0),
        LonLat::new(0.0, 1.0),
        LonLat::new(0.0, 0.0),
    ];
    let footprint = Footprint::from_ring(&ring).unwrap();
    assert_eq!(footprint.ring(), &ring);
}

// ============================================================================
// Invalid shapes
// ============================================================================

fn assert_invalid_geometry(value: serde_json::Value) {
    let result = Footprint::from_json(&value);
    assert!(
        matches!(result, Err(NdviError::InvalidGeometry(_))),
        "expected InvalidGeometry for {}, got {:?}",
        value,
        result
    );
}

#[test]
fn test_footprint_not_an_array() {
    assert_invalid_geometry(json!({"type": "Polygon"}));
    assert_invalid_geometry(json!("0,0,1,1"));
    assert_invalid_geometry(json!(null));
}

#[test]
fn test_footprint_wrong_vertex_count() {
    assert_invalid_geometry(json!([[0, 0], [1, 0], [1, 1], [0, 0]]));
    assert_invalid_geometry(json!([[0, 0], [1, 0], [1, 1], [0, 1], [0, 0.5], [0, 0]]));
}

#[test]
fn test_footprint_wrong_pair_length() {
    assert_invalid_geometry(json!([[0, 0, 5], [1, 0], [1, 1], [0, 1], [0, 0]]));
    assert_invalid_geometry(json!([[0], [1, 0], [1, 1], [0, 1], [0, 0]]));
    assert_invalid_geometry(json!([0, [1, 0], [1, 1], [0, 1], [0, 0]]));
}

#[test]
fn test_footprint_non_numeric_values() {
    assert_invalid_geometry(json!([["a", 0], [1, 0], [1, 1], [0, 1], ["a", 0]]));
    assert_invalid_geometry(json!([[null, 0], [1, 0], [1, 1], [0, 1], [null, 0]]));
}

#[test]
fn test_footprint_non_finite_ring() {
    let ring = [
        LonLat::new(f64::NAN, 0.0),
        LonLat::new(1.0, 0.0),
        LonLat::new(1.0, 1.0),
        LonLat::new(0.0, 1.0),
        LonLat::new(f64::NAN, 0.0),
    ];
    assert!(matches!(
        Footprint::from_ring(&ring),
        Err(NdviError::InvalidGeometry(_))
    ));
}

#[test]
fn test_footprint_open_ring() {
    assert_invalid_geometry(json!([[0, 0], [1, 0], [1, 1], [0, 1], [0, 2]]));
}
