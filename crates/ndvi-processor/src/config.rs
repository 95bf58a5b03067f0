//! NDVI computation options.

use serde::{Deserialize, Serialize};

/// Sentinel-2 L2A scene classes masked by default: cloud shadows (3),
/// water (6) and cloud high probability (9).
pub const DEFAULT_EXCLUDED_CLASSES: [u16; 3] = [3, 6, 9];

/// Options for the NDVI engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NdviOptions {
    /// Classification codes whose pixels are masked out.
    pub excluded_classes: Vec<u16>,

    /// Which NDVI values the median is taken over.
    pub median: MedianMode,

    /// What to store for pixels missing a red, nir or mask sample.
    pub mismatched_samples: MismatchPolicy,
}

impl Default for NdviOptions {
    fn default() -> Self {
        Self {
            excluded_classes: DEFAULT_EXCLUDED_CLASSES.to_vec(),
            median: MedianMode::default(),
            mismatched_samples: MismatchPolicy::default(),
        }
    }
}

impl NdviOptions {
    /// Load options from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override fields from `NDVI_EXCLUDED_CLASSES`, `NDVI_MEDIAN` and
    /// `NDVI_MISMATCHED_SAMPLES` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("NDVI_EXCLUDED_CLASSES") {
            if let Some(classes) = parse_class_list(&val) {
                self.excluded_classes = classes;
            }
        }

        if let Ok(val) = std::env::var("NDVI_MEDIAN") {
            if let Some(mode) = MedianMode::parse(&val) {
                self.median = mode;
            }
        }

        if let Ok(val) = std::env::var("NDVI_MISMATCHED_SAMPLES") {
            if let Some(policy) = MismatchPolicy::parse(&val) {
                self.mismatched_samples = policy;
            }
        }

        self
    }
}

/// Parse a comma separated list of classification codes, e.g. `"3,6,9"`.
///
/// An empty string yields an empty list; any unparsable entry rejects the
/// whole value.
pub fn parse_class_list(s: &str) -> Option<Vec<u16>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}

/// Population used for the median.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedianMode {
    /// Finite NDVI values only, the same population as the mean.
    #[default]
    Filtered,
    /// Every NDVI slot including masked NaN entries, sorted by IEEE total order.
    Raw,
}

impl MedianMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "filtered" => Some(Self::Filtered),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filtered => "filtered",
            Self::Raw => "raw",
        }
    }
}

/// Treatment of pixels where one of the sample arrays is too short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Mark the pixel NaN so it is excluded from the statistics.
    #[default]
    Exclude,
    /// Leave the pixel at 0.0, which the reducers count as a valid NDVI of zero.
    Zero,
}

impl MismatchPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exclude" => Some(Self::Exclude),
            "zero" => Some(Self::Zero),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exclude => "exclude",
            Self::Zero => "zero",
        }
    }
}

impl std::fmt::Display for MedianMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for MismatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
