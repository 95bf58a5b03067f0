//! Raster source and handle traits.

use std::sync::Arc;

use async_trait::async_trait;
use ndvi_common::{BandSamples, Georeference, PixelWindow};

use crate::error::Result;

/// Opens rasters by URL.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Open the raster at `url` (already signed, if signing applies).
    async fn open(&self, url: &str) -> Result<Arc<dyn RasterHandle>>;
}

/// An opened single-band raster.
///
/// Owned by the request that opened it; handles are not shared between
/// requests.
#[async_trait]
pub trait RasterHandle: Send + Sync {
    /// Image width in pixels.
    fn width(&self) -> u64;

    /// Image height in pixels.
    fn height(&self) -> u64;

    /// Origin, pixel resolution and CRS of the pixel grid.
    fn georeference(&self) -> Georeference;

    /// Top-left corner of pixel (0, 0) in the raster CRS.
    fn origin(&self) -> Option<(f64, f64)> {
        self.georeference().origin
    }

    /// Pixel size `(dx, dy)`.
    fn resolution(&self) -> Option<(f64, f64)> {
        self.georeference().resolution
    }

    /// EPSG code of the raster CRS.
    fn epsg(&self) -> Option<u32> {
        self.georeference().epsg
    }

    /// Read the first band inside `window`.
    ///
    /// The window is clipped to the image; the returned width and height
    /// are the clipped dimensions and may be zero.
    async fn read_window(&self, window: PixelWindow) -> Result<BandSamples>;
}
