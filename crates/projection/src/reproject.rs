//! Point reprojection between EPSG coordinate reference systems.

use crate::error::ProjectionError;

/// Reprojects single points between coordinate reference systems.
///
/// Geographic coordinates are always passed and returned in degrees,
/// `(x, y)` = `(lon, lat)`. Implementations are pure and synchronous.
pub trait Reprojector: Send + Sync {
    fn reproject(
        &self,
        source_epsg: u32,
        target_epsg: u32,
        point: (f64, f64),
    ) -> Result<(f64, f64), ProjectionError>;
}

/// Look up the PROJ string for an EPSG code.
pub fn proj_string(epsg: u32) -> Option<&'static str> {
    u16::try_from(epsg)
        .ok()
        .and_then(crs_definitions::from_code)
        .map(|def| def.proj4)
}

/// Check if an EPSG code describes a geographic (lon/lat) CRS.
pub fn is_geographic_crs(epsg: u32) -> bool {
    match proj_string(epsg) {
        Some(def) => def.contains("+proj=longlat"),
        None => epsg == 4326,
    }
}

/// Reprojector backed by `proj4rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Proj4Reprojector;

impl Proj4Reprojector {
    pub fn new() -> Self {
        Self
    }

    fn load(epsg: u32) -> Result<proj4rs::proj::Proj, ProjectionError> {
        let def = proj_string(epsg).ok_or(ProjectionError::UnsupportedCrs(epsg))?;
        proj4rs::proj::Proj::from_proj_string(def).map_err(|e| {
            ProjectionError::InvalidDefinition {
                epsg,
                message: format!("{:?}", e),
            }
        })
    }
}

impl Reprojector for Proj4Reprojector {
    fn reproject(
        &self,
        source_epsg: u32,
        target_epsg: u32,
        point: (f64, f64),
    ) -> Result<(f64, f64), ProjectionError> {
        if source_epsg == target_epsg {
            return Ok(point);
        }

        let source = Self::load(source_epsg)?;
        let target = Self::load(target_epsg)?;

        // proj4rs works in radians for geographic systems
        let (x, y) = if is_geographic_crs(source_epsg) {
            (point.0.to_radians(), point.1.to_radians())
        } else {
            point
        };

        let mut p = (x, y, 0.0);
        proj4rs::transform::transform(&source, &target, &mut p).map_err(|e| {
            ProjectionError::TransformFailed {
                from: source_epsg,
                to: target_epsg,
                message: format!("{:?}", e),
            }
        })?;

        let out = if is_geographic_crs(target_epsg) {
            (p.0.to_degrees(), p.1.to_degrees())
        } else {
            (p.0, p.1)
        };

        if !out.0.is_finite() || !out.1.is_finite() {
            return Err(ProjectionError::TransformFailed {
                from: source_epsg,
                to: target_epsg,
                message: "result is not finite".to_string(),
            });
        }

        tracing::trace!(
            source_epsg,
            target_epsg,
            x = point.0,
            y = point.1,
            out_x = out.0,
            out_y = out.1,
            "Reprojected point"
        );

        Ok(out)
    }
}
