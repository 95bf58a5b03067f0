//! Projection error types.

use ndvi_common::NdviError;
use thiserror::Error;

/// Errors that can occur while reprojecting coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The EPSG code is not in the CRS database.
    #[error("Unsupported CRS: EPSG:{0}")]
    UnsupportedCrs(u32),

    /// The PROJ definition could not be parsed.
    #[error("Invalid projection EPSG:{epsg}: {message}")]
    InvalidDefinition { epsg: u32, message: String },

    /// The transformation itself failed (out of domain, non-convergence, ...).
    #[error("Transform from EPSG:{from} to EPSG:{to} failed: {message}")]
    TransformFailed { from: u32, to: u32, message: String },
}

impl From<ProjectionError> for NdviError {
    fn from(err: ProjectionError) -> Self {
        match err {
            // A raster whose CRS cannot be resolved has no usable georeference.
            ProjectionError::UnsupportedCrs(_) | ProjectionError::InvalidDefinition { .. } => {
                NdviError::Georeference(err.to_string())
            }
            ProjectionError::TransformFailed { .. } => NdviError::InvalidCoordinate(err.to_string()),
        }
    }
}
