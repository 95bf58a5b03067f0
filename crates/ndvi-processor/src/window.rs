//! Pixel windows for point and zonal queries.

use ndvi_common::{Footprint, Georeference, LonLat, NdviError, PixelWindow};
use projection::CoordinateMapper;

use crate::resample::ClassificationLookup;
use crate::types::SpatialQuery;

/// Turns spatial queries into pixel windows of a particular raster.
#[derive(Clone, Default)]
pub struct WindowBuilder {
    mapper: CoordinateMapper,
}

impl WindowBuilder {
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self { mapper }
    }

    /// Window for `query` on the raster described by `georef`.
    pub fn window(&self, georef: &Georeference, query: &SpatialQuery) -> Result<PixelWindow, NdviError> {
        match query {
            SpatialQuery::Point(at) => self.point(georef, *at),
            SpatialQuery::Zonal(footprint) => self.zonal(georef, footprint),
        }
    }

    /// Single-pixel window `[px, py, px + 1, py + 1]` under `at`.
    pub fn point(&self, georef: &Georeference, at: LonLat) -> Result<PixelWindow, NdviError> {
        let (px, py) = self.mapper.pixel(georef, at.lon, at.lat)?;
        Ok(PixelWindow::single(px, py))
    }

    /// Bounding window `[min px, min py, max px, max py]` of the four
    /// footprint corners.
    ///
    /// The quadrilateral is approximated by its pixel-space bounding box;
    /// pixels outside the polygon but inside the box are included.
    pub fn zonal(&self, georef: &Georeference, footprint: &Footprint) -> Result<PixelWindow, NdviError> {
        let pixels = footprint
            .corners()
            .iter()
            .map(|corner| self.mapper.pixel(georef, corner.lon, corner.lat))
            .collect::<Result<Vec<_>, _>>()?;

        PixelWindow::bounding(&pixels)
            .ok_or_else(|| NdviError::InvalidGeometry("footprint has no corners".to_string()))
    }

    /// Classification pixels under each pixel of `window`, a window on the
    /// reflectance raster already clipped to its extent.
    pub fn classification_lookup(
        &self,
        reflectance: &Georeference,
        classification: &Georeference,
        window: PixelWindow,
    ) -> Result<ClassificationLookup, NdviError> {
        let mapping = self.mapper.grid_mapping(reflectance, classification)?;
        ClassificationLookup::build(&mapping, window)
    }
}
