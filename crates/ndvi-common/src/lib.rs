//! Common types shared across the LeafSense NDVI crates.
//!
//! Everything here is plain data: pixel windows, geographic coordinates,
//! raster georeferencing and band samples, plus the request-level error
//! taxonomy every layer eventually converts into.

pub mod error;
pub mod geo;
pub mod samples;
pub mod window;

pub use error::{NdviError, NdviResult};
pub use geo::{Footprint, Georeference, LonLat, WGS84_EPSG};
pub use samples::BandSamples;
pub use window::PixelWindow;
