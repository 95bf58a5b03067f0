//! Geographic coordinates, zonal footprints and raster georeferencing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NdviError;

/// EPSG code of WGS84 geographic coordinates (lon/lat in degrees).
pub const WGS84_EPSG: u32 = 4326;

/// Number of vertices in a closed quadrilateral ring.
const RING_LEN: usize = 5;

/// A WGS84 longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A quadrilateral footprint given as a closed ring of five vertices.
///
/// The first and last vertex are identical. Only the four distinct corners
/// take part in window building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    ring: [LonLat; RING_LEN],
}

impl Footprint {
    /// Validate and build a footprint from a ring of vertices.
    pub fn from_ring(ring: &[LonLat]) -> Result<Self, NdviError> {
        let ring: [LonLat; RING_LEN] = ring.try_into().map_err(|_| {
            NdviError::InvalidGeometry(format!(
                "expected {} vertices, got {}",
                RING_LEN,
                ring.len()
            ))
        })?;

        if let Some(bad) = ring.iter().find(|v| !v.is_finite()) {
            return Err(NdviError::InvalidGeometry(format!(
                "vertex ({}, {}) is not finite",
                bad.lon, bad.lat
            )));
        }

        if ring[0] != ring[RING_LEN - 1] {
            return Err(NdviError::InvalidGeometry(
                "ring is not closed: first and last vertex differ".to_string(),
            ));
        }

        Ok(Self { ring })
    }

    /// Validate and build a footprint from a JSON array of `[lon, lat]` pairs.
    ///
    /// Shape is checked before any value is used: exactly five entries, each an
    /// array of exactly two finite numbers (numeric strings are accepted).
    pub fn from_json(value: &Value) -> Result<Self, NdviError> {
        let vertices = value
            .as_array()
            .ok_or_else(|| NdviError::InvalidGeometry("expected an array of coordinates".into()))?;

        if vertices.len() != RING_LEN {
            return Err(NdviError::InvalidGeometry(format!(
                "expected {} coordinate pairs, got {}",
                RING_LEN,
                vertices.len()
            )));
        }

        let mut ring = Vec::with_capacity(RING_LEN);
        for (i, vertex) in vertices.iter().enumerate() {
            let pair = match vertex.as_array() {
                Some(pair) if pair.len() == 2 => pair,
                _ => {
                    return Err(NdviError::InvalidGeometry(format!(
                        "coordinate {} is not a [lon, lat] pair",
                        i
                    )))
                }
            };

            let lon = number_from_json(&pair[0]);
            let lat = number_from_json(&pair[1]);
            match (lon, lat) {
                (Some(lon), Some(lat)) => ring.push(LonLat::new(lon, lat)),
                _ => {
                    return Err(NdviError::InvalidGeometry(format!(
                        "coordinate {} contains a non-numeric value",
                        i
                    )))
                }
            }
        }

        Self::from_ring(&ring)
    }

    /// The four distinct corners (ring without its closing vertex).
    pub fn corners(&self) -> [LonLat; 4] {
        [self.ring[0], self.ring[1], self.ring[2], self.ring[3]]
    }

    /// The full closed ring.
    pub fn ring(&self) -> &[LonLat; RING_LEN] {
        &self.ring
    }
}

/// Interpret a JSON value as a finite number.
///
/// Accepts JSON numbers and strings holding a number; everything else, and
/// any non-finite result, is `None`.
pub fn number_from_json(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Georeferencing of a raster's pixel grid.
///
/// Any field may be missing for rasters without usable GeoTIFF tags; the
/// coordinate mapper rejects such rasters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Georeference {
    /// Projected coordinates of the top-left corner of pixel (0, 0).
    pub origin: Option<(f64, f64)>,
    /// Pixel size `(dx, dy)`; `dy` is usually negative for north-up images.
    pub resolution: Option<(f64, f64)>,
    /// EPSG code of the raster's coordinate reference system.
    pub epsg: Option<u32>,
}

impl Georeference {
    pub fn new(origin: (f64, f64), resolution: (f64, f64), epsg: u32) -> Self {
        Self {
            origin: Some(origin),
            resolution: Some(resolution),
            epsg: Some(epsg),
        }
    }
}
