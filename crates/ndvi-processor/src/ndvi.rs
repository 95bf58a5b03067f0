//! Per-pixel NDVI and its reductions.

use std::collections::BTreeSet;

use ndvi_common::NdviError;

use crate::config::{MedianMode, MismatchPolicy, NdviOptions};
use crate::types::StatisticsResult;

/// Decides which scene classification codes are usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationPolicy {
    excluded: BTreeSet<u16>,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EXCLUDED_CLASSES)
    }
}

impl ClassificationPolicy {
    pub fn new(excluded: impl IntoIterator<Item = u16>) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
        }
    }

    pub fn from_options(options: &NdviOptions) -> Self {
        Self::new(options.excluded_classes.iter().copied())
    }

    /// A code is good unless it is one of the excluded classes.
    pub fn is_good_pixel(&self, code: f32) -> bool {
        !self.excluded.iter().any(|&class| class as f32 == code)
    }

    pub fn excluded(&self) -> impl Iterator<Item = u16> + '_ {
        self.excluded.iter().copied()
    }
}

/// Validity mask (1 = usable, 0 = excluded) for classification samples.
pub fn validity_mask(classification: &[f32], policy: &ClassificationPolicy) -> Vec<u8> {
    classification
        .iter()
        .map(|&code| u8::from(policy.is_good_pixel(code)))
        .collect()
}

/// Fraction of usable entries in `mask`; 0 for an empty mask.
pub fn validity_ratio(mask: &[u8]) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    let valid = mask.iter().filter(|&&m| m != 0).count();
    valid as f64 / mask.len() as f64
}

/// NDVI for every mask slot.
///
/// Masked pixels are NaN. Pixels without a red or nir sample are NaN or
/// 0.0 depending on `mismatch`. The output always has `mask.len()`
/// entries. `0 / 0` yields NaN and is dropped by the reducers.
pub fn compute_ndvi(red: &[f32], nir: &[f32], mask: &[u8], mismatch: MismatchPolicy) -> Vec<f32> {
    let missing = match mismatch {
        MismatchPolicy::Exclude => f32::NAN,
        MismatchPolicy::Zero => 0.0,
    };

    mask.iter()
        .enumerate()
        .map(|(i, &usable)| match (red.get(i), nir.get(i)) {
            (Some(&r), Some(&n)) if usable != 0 => (n - r) / (n + r),
            (Some(_), Some(_)) => f32::NAN,
            _ => missing,
        })
        .collect()
}

/// Arithmetic mean of the finite values.
pub fn mean(values: &[f32]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0usize), |(sum, count), &v| (sum + v as f64, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Median of `values`.
///
/// Even lengths average the two middle values. In [`MedianMode::Raw`]
/// the NaN markers take part in the sort; a non-finite result is `None`.
pub fn median(values: &[f32], mode: MedianMode) -> Option<f64> {
    let mut sorted: Vec<f32> = match mode {
        MedianMode::Filtered => values.iter().copied().filter(|v| v.is_finite()).collect(),
        MedianMode::Raw => values.to_vec(),
    };
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    let value = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };

    value.is_finite().then_some(value)
}

/// Reduce a validity mask and NDVI array to a [`StatisticsResult`].
pub fn summarize(ndvi: &[f32], validity: f64, mode: MedianMode) -> StatisticsResult {
    if validity <= 0.0 {
        return StatisticsResult::empty(0.0, NdviError::NoValidPixels.to_string());
    }

    match (mean(ndvi), median(ndvi, mode)) {
        (Some(mean), median) => StatisticsResult {
            mean_ndvi: Some(mean),
            median_ndvi: median,
            validity,
            reason: None,
        },
        (None, _) => StatisticsResult::empty(validity, "No finite NDVI value in window"),
    }
}
