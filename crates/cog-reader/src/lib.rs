//! Raster access for the NDVI pipeline.
//!
//! The pipeline only needs a narrow capability from a raster: its size,
//! its georeferencing and a windowed read of the first band. That
//! capability is the [`RasterHandle`] trait, produced by a [`RasterSource`].
//!
//! Two sources ship with the crate:
//!
//! - [`HttpCogSource`] reads Cloud Optimized GeoTIFFs with HTTP range
//!   requests, fetching only the header and the internal tiles that
//!   overlap the requested window.
//! - [`MemoryRasterSource`] serves rasters held in memory.
//!
//! ```text
//! open(url)
//!    │
//!    ├─► fetch first 64 KiB ─► parse header + first IFD + GeoKeys
//!    │
//! read_window([minX, minY, maxX, maxY])
//!    │
//!    ├─► clip to image extent
//!    ├─► fetch overlapping tiles concurrently (range requests)
//!    ├─► inflate + undo predictor
//!    └─► assemble row-major samples
//! ```

pub mod decode;
pub mod error;
pub mod http;
pub mod memory;
pub mod reader;
pub mod source;
pub mod tiff;

pub use error::{CogError, Result};
pub use http::RangeClient;
pub use memory::{MemoryRaster, MemoryRasterSource};
pub use reader::{CogReader, HttpCogSource, RangeRead, RemoteFile, HEADER_FETCH_BYTES};
pub use source::{RasterHandle, RasterSource};
