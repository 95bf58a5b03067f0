//! Pipeline inputs and outputs.

use ndvi_common::{Footprint, LonLat};
use serde::{Deserialize, Serialize};

/// Where to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialQuery {
    /// A single pixel under a WGS84 coordinate.
    Point(LonLat),
    /// The pixel-space bounding box of a quadrilateral footprint.
    Zonal(Footprint),
}

impl SpatialQuery {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Zonal(_) => "zonal",
        }
    }
}

/// URLs of the three bands, already signed when signing applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandUrls {
    pub red: String,
    pub nir: String,
    pub scl: String,
}

impl BandUrls {
    pub fn new(red: impl Into<String>, nir: impl Into<String>, scl: impl Into<String>) -> Self {
        Self {
            red: red.into(),
            nir: nir.into(),
            scl: scl.into(),
        }
    }

    /// Apply `f` to each URL.
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            red: f(&self.red),
            nir: f(&self.nir),
            scl: f(&self.scl),
        }
    }
}

/// Statistics over the masked NDVI array.
///
/// `validity` is the usable-pixel fraction in `[0, 1]`. When it is zero,
/// `mean_ndvi` and `median_ndvi` are `None` and `reason` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    #[serde(rename = "meanNDVI")]
    pub mean_ndvi: Option<f64>,

    #[serde(rename = "medianNDVI")]
    pub median_ndvi: Option<f64>,

    pub validity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatisticsResult {
    /// A result with no statistics.
    pub fn empty(validity: f64, reason: impl Into<String>) -> Self {
        Self {
            mean_ndvi: None,
            median_ndvi: None,
            validity,
            reason: Some(reason.into()),
        }
    }

    pub fn has_statistics(&self) -> bool {
        self.mean_ndvi.is_some()
    }
}
