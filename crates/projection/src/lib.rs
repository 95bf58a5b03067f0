//! Coordinate reference system transformations.
//!
//! Reprojection is pure Rust (`proj4rs` with PROJ strings from the
//! `crs-definitions` EPSG database). On top of it sits the coordinate
//! mapper that turns a WGS84 lon/lat into integer pixel indices of a
//! georeferenced raster.

pub mod error;
pub mod mapper;
pub mod reproject;

pub use error::ProjectionError;
pub use mapper::{CoordinateMapper, GridMapping};
pub use reproject::{is_geographic_crs, proj_string, Proj4Reprojector, Reprojector};
