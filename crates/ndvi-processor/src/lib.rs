//! NDVI statistics over windows of three co-registered raster bands.
//!
//! ```text
//! SpatialQuery (point | zonal footprint)
//!      │
//!      ▼
//! WindowBuilder ──► CoordinateMapper ──► Reprojector
//!      │
//!      ├─► red / nir window (reflectance grid)
//!      └─► ClassificationLookup: reflectance pixel centre ──► scl pixel
//!            └─► scl window covering every looked-up pixel
//!      │
//!      ▼
//! read_window x3 (concurrent)
//!      │
//!      ├─► classification ──► validity mask ──► gather onto reflectance grid
//!      │
//!      ▼
//! validity == 0 ? ──► "no valid pixel" result
//!      │
//!      ▼
//! per-pixel NDVI ──► mean / median ──► StatisticsResult
//! ```

pub mod config;
pub mod ndvi;
pub mod pipeline;
pub mod resample;
pub mod types;
pub mod window;

pub use config::{MedianMode, MismatchPolicy, NdviOptions};
pub use ndvi::{
    compute_ndvi, mean, median, summarize, validity_mask, validity_ratio, ClassificationPolicy,
};
pub use pipeline::NdviPipeline;
pub use resample::{resample_nearest, ClassificationLookup};
pub use types::{BandUrls, SpatialQuery, StatisticsResult};
pub use window::WindowBuilder;
