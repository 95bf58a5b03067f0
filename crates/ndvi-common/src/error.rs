//! Request-level error taxonomy.
//!
//! Lower layers (raster access, reprojection, token fetches) keep their own
//! error enums and convert into [`NdviError`] at the pipeline boundary. The
//! HTTP layer turns every variant into a structured response with a
//! human-readable `reason`; none of them is allowed to escape as a fault.

use thiserror::Error;

/// Result type alias using NdviError.
pub type NdviResult<T> = Result<T, NdviError>;

/// Errors surfaced by an NDVI request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NdviError {
    /// A required request field was absent.
    #[error("Missing parameters: {0}")]
    MissingInput(String),

    /// The zonal footprint is not a 5-vertex closed ring of finite pairs.
    #[error("GeoJSON parameter is not valid: {0}")]
    InvalidGeometry(String),

    /// The raster has no usable origin, resolution or CRS.
    #[error("Raster georeference unusable: {0}")]
    Georeference(String),

    /// A coordinate could not be mapped to pixel space.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Every pixel in the window is masked out (cloud, shadow, ...).
    ///
    /// This is an expected outcome for obscured scenes, not a pipeline failure.
    #[error("Cloud or shadow mask/ No valid pixel")]
    NoValidPixels,

    /// A raster read or credential fetch failed.
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),
}

impl NdviError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            NdviError::MissingInput(_) => "MissingInputError",
            NdviError::InvalidGeometry(_) => "InvalidGeometryError",
            NdviError::Georeference(_) => "GeoreferenceError",
            NdviError::InvalidCoordinate(_) => "InvalidCoordinateError",
            NdviError::NoValidPixels => "NoValidPixelsError",
            NdviError::UpstreamFetch(_) => "UpstreamFetchError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NdviError::MissingInput(_)
            | NdviError::InvalidGeometry(_)
            | NdviError::Georeference(_)
            | NdviError::InvalidCoordinate(_) => 400,

            NdviError::NoValidPixels => 200,

            NdviError::UpstreamFetch(_) => 502,
        }
    }

    /// Whether this error is a legitimate empty result rather than a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, NdviError::NoValidPixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(NdviError::MissingInput("lat".into()).http_status_code(), 400);
        assert_eq!(NdviError::InvalidGeometry("ring".into()).http_status_code(), 400);
        assert_eq!(NdviError::NoValidPixels.http_status_code(), 200);
        assert_eq!(NdviError::UpstreamFetch("boom".into()).http_status_code(), 502);
    }

    #[test]
    fn test_no_valid_pixels_is_distinguishable() {
        let empty = NdviError::NoValidPixels;
        let upstream = NdviError::UpstreamFetch("timeout".into());

        assert!(empty.is_empty_result());
        assert!(!upstream.is_empty_result());
        assert_ne!(empty.to_string(), upstream.to_string());
        assert!(empty.to_string().contains("No valid pixel"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NdviError::Georeference("x".into()).kind(), "GeoreferenceError");
        assert_eq!(NdviError::InvalidCoordinate("x".into()).kind(), "InvalidCoordinateError");
    }
}
