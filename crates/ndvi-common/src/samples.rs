//! Band sample arrays returned by windowed raster reads.

/// Samples of one band inside a (possibly clipped) pixel window.
///
/// `data` is row-major, top-to-bottom. `width` and `height` are the window
/// dimensions as actually returned, which can be smaller than requested when
/// the window crosses the image edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSamples {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl BandSamples {
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// An empty 0x0 sample set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of pixels the dimensions describe.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Get the sample at a grid coordinate.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }
}
