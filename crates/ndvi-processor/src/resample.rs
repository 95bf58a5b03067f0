//! Nearest-neighbour grid resampling.

use ndvi_common::{NdviError, PixelWindow};
use projection::GridMapping;

/// Resample a row-major grid to `dst_width` x `dst_height` by nearest
/// neighbour.
///
/// Source indices are `floor(dst * src / dst_size)` clamped to the last
/// row/column, so equal sizes copy the grid and integer upscales
/// replicate each source cell into a `k x k` block. A smaller target
/// decimates with the same formula. An empty source fills the target
/// with `T::default()`.
pub fn resample_nearest<T: Copy + Default>(
    src: &[T],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<T> {
    if src_width == 0 || src_height == 0 {
        return vec![T::default(); dst_width * dst_height];
    }

    let mut out = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let sy = (y * src_height / dst_height).min(src_height - 1);
        let row = sy * src_width;
        for x in 0..dst_width {
            let sx = (x * src_width / dst_width).min(src_width - 1);
            out.push(src.get(row + sx).copied().unwrap_or_default());
        }
    }
    out
}

/// The classification pixel under each pixel of a reflectance window.
///
/// Cells are found through pixel centres, so the lookup holds when the
/// two grids differ in resolution, origin or CRS. Row-major over the
/// reflectance window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationLookup {
    cells: Vec<(i64, i64)>,
    window: PixelWindow,
}

impl ClassificationLookup {
    /// Map every pixel of `reflectance` through `mapping`.
    ///
    /// `reflectance` should already be clipped to its image so each cell
    /// lines up with a sample that will actually be read.
    pub fn build(mapping: &GridMapping, reflectance: PixelWindow) -> Result<Self, NdviError> {
        let mut cells = Vec::with_capacity(reflectance.pixel_count() as usize);
        for row in reflectance.min_y..reflectance.max_y {
            for col in reflectance.min_x..reflectance.max_x {
                cells.push(mapping.map(col, row)?);
            }
        }

        // bounding() is inclusive of its largest cell
        let window = match PixelWindow::bounding(&cells) {
            Some(b) => PixelWindow::new(
                b.min_x,
                b.min_y,
                b.max_x.saturating_add(1),
                b.max_y.saturating_add(1),
            ),
            None => PixelWindow::new(0, 0, 0, 0),
        };

        Ok(Self { cells, window })
    }

    /// Smallest classification window holding every looked-up cell.
    pub fn window(&self) -> PixelWindow {
        self.window
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pick the value under each reflectance pixel from `src`, the samples
    /// read for `read` on the classification grid.
    ///
    /// Cells outside `read` get `T::default()`.
    pub fn gather<T: Copy + Default>(&self, src: &[T], read: PixelWindow) -> Vec<T> {
        let width = read.width() as i64;

        self.cells
            .iter()
            .map(|&(cx, cy)| {
                let inside =
                    cx >= read.min_x && cx < read.max_x && cy >= read.min_y && cy < read.max_y;
                if !inside {
                    return T::default();
                }
                let index = (cy - read.min_y) * width + (cx - read.min_x);
                src.get(index as usize).copied().unwrap_or_default()
            })
            .collect()
    }
}
