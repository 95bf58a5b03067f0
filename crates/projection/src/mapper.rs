//! WGS84 lon/lat to raster pixel index mapping.

use std::sync::Arc;

use ndvi_common::{Georeference, NdviError, WGS84_EPSG};

use crate::reproject::{Proj4Reprojector, Reprojector};

/// Maps geographic coordinates onto a raster's pixel grid.
///
/// Pixel `(0, 0)` is the top-left pixel. The returned indices may be
/// negative or beyond the grid; bounds checks are the caller's job.
#[derive(Clone)]
pub struct CoordinateMapper {
    reprojector: Arc<dyn Reprojector>,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(Arc::new(Proj4Reprojector::new()))
    }
}

impl CoordinateMapper {
    pub fn new(reprojector: Arc<dyn Reprojector>) -> Self {
        Self { reprojector }
    }

    /// Convert `(lon, lat)` to integer pixel indices `(px, py)`.
    ///
    /// ```text
    /// px = floor((x - origin_x) / pixel_width)
    /// py = floor((origin_y - y) / |pixel_height|)
    /// ```
    pub fn pixel(&self, georef: &Georeference, lon: f64, lat: f64) -> Result<(i64, i64), NdviError> {
        let grid = Grid::from_georeference(georef)?;

        if !lon.is_finite() || !lat.is_finite() {
            return Err(NdviError::InvalidCoordinate(format!(
                "({}, {}) is not a finite coordinate",
                lon, lat
            )));
        }

        let (x, y) = self.reprojector.reproject(WGS84_EPSG, grid.epsg, (lon, lat))?;

        grid.index(x, y).ok_or_else(|| {
            NdviError::InvalidCoordinate(format!("Pixels are undefined for ({}, {})", lon, lat))
        })
    }

    /// Build a mapping from the pixels of `from` onto the pixels of `to`.
    pub fn grid_mapping(&self, from: &Georeference, to: &Georeference) -> Result<GridMapping, NdviError> {
        Ok(GridMapping {
            from: Grid::from_georeference(from)?,
            to: Grid::from_georeference(to)?,
            reprojector: Arc::clone(&self.reprojector),
        })
    }
}

/// Maps pixels of one raster grid onto another, through pixel centres.
///
/// Used to find the classification pixel under each reflectance pixel when
/// the two bands differ in resolution, origin or CRS.
#[derive(Clone)]
pub struct GridMapping {
    from: Grid,
    to: Grid,
    reprojector: Arc<dyn Reprojector>,
}

impl GridMapping {
    /// Pixel of the target grid containing the centre of `(col, row)` on
    /// the source grid.
    pub fn map(&self, col: i64, row: i64) -> Result<(i64, i64), NdviError> {
        let centre = self.from.centre(col, row);
        let (x, y) = if self.from.epsg == self.to.epsg {
            centre
        } else {
            self.reprojector.reproject(self.from.epsg, self.to.epsg, centre)?
        };

        self.to.index(x, y).ok_or_else(|| {
            NdviError::InvalidCoordinate(format!("Pixel ({}, {}) has no counterpart", col, row))
        })
    }
}

/// A validated north-up pixel grid.
#[derive(Debug, Clone, Copy)]
struct Grid {
    epsg: u32,
    origin: (f64, f64),
    resolution: (f64, f64),
}

impl Grid {
    fn from_georeference(georef: &Georeference) -> Result<Self, NdviError> {
        let epsg = georef
            .epsg
            .ok_or_else(|| NdviError::Georeference("raster has no CRS".to_string()))?;

        let origin = match georef.origin {
            Some((x, y)) if usable(x) && usable(y) => (x, y),
            _ => return Err(NdviError::Georeference("Failed to get image origin".to_string())),
        };

        let resolution = match georef.resolution {
            Some((dx, dy)) if usable(dx) && usable(dy) => (dx, dy),
            _ => {
                return Err(NdviError::Georeference(
                    "Failed to get image resolution".to_string(),
                ))
            }
        };

        Ok(Self {
            epsg,
            origin,
            resolution,
        })
    }

    fn index(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let px = ((x - self.origin.0) / self.resolution.0).floor();
        let py = ((self.origin.1 - y) / self.resolution.1.abs()).floor();

        if px.is_finite() && py.is_finite() {
            Some((px as i64, py as i64))
        } else {
            None
        }
    }

    fn centre(&self, col: i64, row: i64) -> (f64, f64) {
        (
            self.origin.0 + (col as f64 + 0.5) * self.resolution.0,
            self.origin.1 - (row as f64 + 0.5) * self.resolution.1.abs(),
        )
    }
}

/// Georeference components must be present, finite and non-zero.
fn usable(v: f64) -> bool {
    v.is_finite() && v != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;

    /// Reprojector that returns its input unchanged.
    struct Identity;

    impl Reprojector for Identity {
        fn reproject(
            &self,
            _source_epsg: u32,
            _target_epsg: u32,
            point: (f64, f64),
        ) -> Result<(f64, f64), ProjectionError> {
            Ok(point)
        }
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(Arc::new(Identity))
    }

    #[test]
    fn test_pixel_top_left_origin() {
        let georef = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        assert_eq!(mapper().pixel(&georef, 100.0, 200.0).unwrap(), (0, 0));
        assert_eq!(mapper().pixel(&georef, 125.0, 175.0).unwrap(), (2, 2));
    }

    #[test]
    fn test_pixel_negative_height_is_normalized() {
        let down = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        let up = Georeference::new((100.0, 200.0), (10.0, 10.0), 32633);
        assert_eq!(
            mapper().pixel(&down, 155.0, 145.0).unwrap(),
            mapper().pixel(&up, 155.0, 145.0).unwrap()
        );
    }

    #[test]
    fn test_pixel_out_of_bounds_is_returned() {
        let georef = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        assert_eq!(mapper().pixel(&georef, 85.0, 215.0).unwrap(), (-2, -2));
    }

    #[test]
    fn test_missing_georeference() {
        let no_crs = Georeference {
            epsg: None,
            ..Georeference::new((1.0, 1.0), (1.0, -1.0), 4326)
        };
        let no_origin = Georeference {
            origin: None,
            ..Georeference::new((1.0, 1.0), (1.0, -1.0), 4326)
        };
        let zero_res = Georeference::new((1.0, 1.0), (0.0, -1.0), 4326);

        for georef in [no_crs, no_origin, zero_res] {
            assert!(matches!(
                mapper().pixel(&georef, 0.5, 0.5),
                Err(NdviError::Georeference(_))
            ));
        }
    }

    #[test]
    fn test_non_finite_coordinate() {
        let georef = Georeference::new((1.0, 1.0), (1.0, -1.0), 4326);
        assert!(matches!(
            mapper().pixel(&georef, f64::NAN, 0.5),
            Err(NdviError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_unsupported_crs_is_georeference_error() {
        let georef = Georeference::new((1.0, 1.0), (1.0, -1.0), 99999);
        let mapper = CoordinateMapper::default();
        assert!(matches!(
            mapper.pixel(&georef, 0.5, 0.5),
            Err(NdviError::Georeference(_))
        ));
    }

    #[test]
    fn test_grid_mapping_coarser_grid() {
        let fine = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        let coarse = Georeference::new((100.0, 200.0), (20.0, -20.0), 32633);
        let mapping = mapper().grid_mapping(&fine, &coarse).unwrap();

        assert_eq!(mapping.map(0, 0).unwrap(), (0, 0));
        assert_eq!(mapping.map(1, 1).unwrap(), (0, 0));
        assert_eq!(mapping.map(2, 3).unwrap(), (1, 1));
        assert_eq!(mapping.map(-1, 0).unwrap(), (-1, 0));
    }

    #[test]
    fn test_grid_mapping_shifted_origin() {
        // coarse grid starts half a coarse pixel to the right
        let fine = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        let coarse = Georeference::new((110.0, 200.0), (20.0, -20.0), 32633);
        let mapping = mapper().grid_mapping(&fine, &coarse).unwrap();

        assert_eq!(mapping.map(0, 0).unwrap(), (-1, 0));
        assert_eq!(mapping.map(1, 0).unwrap(), (0, 0));
        assert_eq!(mapping.map(2, 0).unwrap(), (0, 0));
        assert_eq!(mapping.map(3, 0).unwrap(), (1, 0));
    }

    #[test]
    fn test_grid_mapping_needs_both_georeferences() {
        let georef = Georeference::new((100.0, 200.0), (10.0, -10.0), 32633);
        let no_origin = Georeference {
            origin: None,
            ..georef
        };
        assert!(matches!(
            mapper().grid_mapping(&georef, &no_origin),
            Err(NdviError::Georeference(_))
        ));
    }
}
