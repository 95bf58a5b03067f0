//! Pixel window types and operations.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in a raster's pixel grid.
///
/// Half-open: `max_x` and `max_y` are exclusive. Coordinates may be negative
/// or exceed the grid; [`PixelWindow::clip`] intersects with the image extent.
/// Always `min_x <= max_x` and `min_y <= max_y`; zero-area windows are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelWindow {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl PixelWindow {
    /// Create a window from two opposite corners, normalizing their order.
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Single-pixel window `[px, py, px + 1, py + 1]`.
    pub fn single(px: i64, py: i64) -> Self {
        Self::new(px, py, px.saturating_add(1), py.saturating_add(1))
    }

    /// Bounding window `[min(px), min(py), max(px), max(py)]` of a set of pixels.
    ///
    /// Returns `None` for an empty slice.
    pub fn bounding(pixels: &[(i64, i64)]) -> Option<Self> {
        let (first, rest) = pixels.split_first()?;
        let mut window = Self::new(first.0, first.1, first.0, first.1);
        for &(px, py) in rest {
            window.min_x = window.min_x.min(px);
            window.min_y = window.min_y.min(py);
            window.max_x = window.max_x.max(px);
            window.max_y = window.max_y.max(py);
        }
        Some(window)
    }

    /// Width in pixels.
    pub fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x)
    }

    /// Height in pixels.
    pub fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y)
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    /// True for zero-area windows.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersect with an image of `width` x `height` pixels.
    ///
    /// A window entirely outside the image collapses to a zero-area window
    /// anchored inside the image bounds.
    pub fn clip(&self, width: u64, height: u64) -> Self {
        let w = i64::try_from(width).unwrap_or(i64::MAX);
        let h = i64::try_from(height).unwrap_or(i64::MAX);

        let min_x = self.min_x.clamp(0, w);
        let min_y = self.min_y.clamp(0, h);
        let max_x = self.max_x.clamp(min_x, w);
        let max_y = self.max_y.clamp(min_y, h);

        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// `[min_x, min_y, max_x, max_y]`, the layout used by windowed reads.
    pub fn as_array(&self) -> [i64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl std::fmt::Display for PixelWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_is_one_by_one() {
        let window = PixelWindow::single(42, -7);
        assert_eq!(window.as_array(), [42, -7, 43, -6]);
        assert_eq!(window.width(), 1);
        assert_eq!(window.height(), 1);
    }

    #[test]
    fn test_new_normalizes_order() {
        let window = PixelWindow::new(10, 10, 0, 0);
        assert_eq!(window.as_array(), [0, 0, 10, 10]);
    }

    #[test]
    fn test_bounding() {
        let window = PixelWindow::bounding(&[(0, 0), (10, 0), (10, 10), (0, 10)]).unwrap();
        assert_eq!(window.as_array(), [0, 0, 10, 10]);
        assert!(PixelWindow::bounding(&[]).is_none());
    }

    #[test]
    fn test_degenerate_window() {
        let window = PixelWindow::bounding(&[(5, 5), (5, 5)]).unwrap();
        assert!(window.is_empty());
        assert_eq!(window.pixel_count(), 0);
    }

    #[test]
    fn test_clip_inside_and_outside() {
        let inside = PixelWindow::new(2, 3, 6, 8).clip(100, 100);
        assert_eq!(inside.as_array(), [2, 3, 6, 8]);

        let straddling = PixelWindow::new(-5, 95, 5, 105).clip(100, 100);
        assert_eq!(straddling.as_array(), [0, 95, 5, 100]);

        let outside = PixelWindow::new(200, 200, 210, 210).clip(100, 100);
        assert!(outside.is_empty());
        assert!(outside.min_x <= outside.max_x && outside.min_y <= outside.max_y);
    }
}
