//! In-memory rasters.
//!
//! Used for tests and for serving small rasters without a network round
//! trip. Reads behave exactly like the HTTP reader: windows are clipped to
//! the image extent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use ndvi_common::{BandSamples, Georeference, PixelWindow};

use crate::error::{CogError, Result};
use crate::source::{RasterHandle, RasterSource};

/// A single-band raster held in memory.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    width: u64,
    height: u64,
    georeference: Georeference,
    data: Vec<f32>,
}

impl MemoryRaster {
    /// Create a raster from row-major samples.
    pub fn new(width: u64, height: u64, georeference: Georeference, data: Vec<f32>) -> Result<Self> {
        let expected = width.checked_mul(height).ok_or_else(|| CogError::invalid("raster too large"))?;
        if data.len() as u64 != expected {
            return Err(CogError::invalid(format!(
                "{}x{} raster needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            georeference,
            data,
        })
    }

    /// A raster where every pixel has the same value.
    pub fn filled(width: u64, height: u64, georeference: Georeference, value: f32) -> Self {
        Self {
            width,
            height,
            georeference,
            data: vec![value; (width * height) as usize],
        }
    }
}

#[async_trait]
impl RasterHandle for MemoryRaster {
    fn width(&self) -> u64 {
        self.width
    }

    fn height(&self) -> u64 {
        self.height
    }

    fn georeference(&self) -> Georeference {
        self.georeference
    }

    async fn read_window(&self, window: PixelWindow) -> Result<BandSamples> {
        let clipped = window.clip(self.width, self.height);
        let w = clipped.width() as usize;
        let h = clipped.height() as usize;

        let mut data = Vec::with_capacity(w * h);
        for row in clipped.min_y..clipped.max_y {
            let start = (row as u64 * self.width + clipped.min_x as u64) as usize;
            data.extend_from_slice(&self.data[start..start + w]);
        }

        Ok(BandSamples::new(data, w, h))
    }
}

/// Serves registered [`MemoryRaster`]s by URL.
///
/// Lookups ignore the query string, so signed and unsigned URLs resolve to
/// the same raster.
#[derive(Default)]
pub struct MemoryRasterSource {
    rasters: RwLock<HashMap<String, Arc<MemoryRaster>>>,
    opens: AtomicUsize,
}

impl MemoryRasterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raster under `url`.
    pub fn insert(&self, url: impl Into<String>, raster: MemoryRaster) {
        self.rasters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), Arc::new(raster));
    }

    /// Builder-style [`MemoryRasterSource::insert`].
    pub fn with_raster(self, url: impl Into<String>, raster: MemoryRaster) -> Self {
        self.insert(url, raster);
        self
    }

    /// Number of `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RasterSource for MemoryRasterSource {
    async fn open(&self, url: &str) -> Result<Arc<dyn RasterHandle>> {
        self.opens.fetch_add(1, Ordering::Relaxed);

        let key = url.split_once('?').map(|(base, _)| base).unwrap_or(url);
        let rasters = self.rasters.read().unwrap_or_else(PoisonError::into_inner);

        rasters
            .get(key)
            .cloned()
            .map(|r| r as Arc<dyn RasterHandle>)
            .ok_or_else(|| CogError::NotFound(key.to_string()))
    }
}
