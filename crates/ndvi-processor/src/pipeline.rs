//! The NDVI pipeline: open, window, read, mask, reduce.

use std::sync::Arc;
use std::time::Instant;

use cog_reader::RasterSource;
use ndvi_common::{BandSamples, NdviError};
use tracing::{debug, info};

use crate::config::NdviOptions;
use crate::ndvi::{compute_ndvi, summarize, validity_mask, validity_ratio, ClassificationPolicy};
use crate::resample::resample_nearest;
use crate::types::{BandUrls, SpatialQuery, StatisticsResult};
use crate::window::WindowBuilder;

/// Reason reported when the window holds no reflectance pixels at all.
pub const EMPTY_WINDOW_REASON: &str = "No pixels inside the requested window";

/// Computes NDVI statistics for spatial queries over three bands.
///
/// One instance serves every request; it holds no per-request state.
pub struct NdviPipeline {
    source: Arc<dyn RasterSource>,
    windows: WindowBuilder,
    options: NdviOptions,
    policy: ClassificationPolicy,
}

impl NdviPipeline {
    pub fn new(source: Arc<dyn RasterSource>, windows: WindowBuilder, options: NdviOptions) -> Self {
        let policy = ClassificationPolicy::from_options(&options);
        Self {
            source,
            windows,
            options,
            policy,
        }
    }

    pub fn options(&self) -> &NdviOptions {
        &self.options
    }

    /// Run `query` against `bands`.
    ///
    /// The red raster defines the reflectance grid (red and nir share it).
    /// Each reflectance pixel takes its class from the classification pixel
    /// under its centre, so the classification raster may have its own
    /// resolution, origin and CRS.
    pub async fn run(&self, query: &SpatialQuery, bands: &BandUrls) -> Result<StatisticsResult, NdviError> {
        let start = Instant::now();

        let (red, nir, scl) = tokio::try_join!(
            self.source.open(&bands.red),
            self.source.open(&bands.nir),
            self.source.open(&bands.scl),
        )?;

        let window = self.windows.window(&red.georeference(), query)?;
        let reflectance = window.clip(red.width(), red.height());
        let lookup = self.windows.classification_lookup(
            &red.georeference(),
            &scl.georeference(),
            reflectance,
        )?;
        let scl_window = lookup.window();

        debug!(
            query = query.kind(),
            window = %window,
            scl_window = %scl_window,
            "Built pixel windows"
        );

        let (red_samples, nir_samples, scl_samples) = tokio::try_join!(
            red.read_window(window),
            nir.read_window(window),
            scl.read_window(scl_window),
        )?;

        let native_mask = validity_mask(&scl_samples.data, &self.policy);
        let mask = lookup.gather(&native_mask, scl_window.clip(scl.width(), scl.height()));
        let result = self.reduce(&red_samples, &nir_samples, &mask);

        info!(
            query = query.kind(),
            pixels = red_samples.pixel_count(),
            validity = result.validity,
            mean = ?result.mean_ndvi,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "NDVI computed"
        );

        Ok(result)
    }

    /// Mask, compute and reduce samples read over the same ground extent.
    ///
    /// A coarser classification grid is stretched onto the reflectance grid.
    pub fn compute(&self, red: &BandSamples, nir: &BandSamples, scl: &BandSamples) -> StatisticsResult {
        if red.is_empty() {
            return StatisticsResult::empty(0.0, EMPTY_WINDOW_REASON);
        }
        if scl.is_empty() {
            return StatisticsResult::empty(0.0, NdviError::NoValidPixels.to_string());
        }

        let native_mask = validity_mask(&scl.data, &self.policy);
        let mask = resample_nearest(&native_mask, scl.width, scl.height, red.width, red.height);
        self.reduce(red, nir, &mask)
    }

    /// Compute and reduce with `mask` already on the reflectance grid.
    pub fn reduce(&self, red: &BandSamples, nir: &BandSamples, mask: &[u8]) -> StatisticsResult {
        if red.is_empty() {
            return StatisticsResult::empty(0.0, EMPTY_WINDOW_REASON);
        }

        let validity = validity_ratio(mask);
        if validity == 0.0 {
            return StatisticsResult::empty(0.0, NdviError::NoValidPixels.to_string());
        }

        let ndvi = compute_ndvi(&red.data, &nir.data, mask, self.options.mismatched_samples);
        summarize(&ndvi, validity, self.options.median)
    }
}
