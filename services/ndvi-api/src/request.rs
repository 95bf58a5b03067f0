//! Request body parsing for the NDVI endpoints.
//!
//! Bodies arrive as loose JSON: coordinates may be numbers or numeric
//! strings. Parsing produces typed requests, and cache keys are built from
//! the parsed values so `"51.3"` and `51.3` share an entry.

use ndvi_common::{Footprint, LonLat, NdviError};
use ndvi_processor::{BandUrls, SpatialQuery};
use serde_json::{json, Map, Value};

use crate::request_cache::CacheKey;

const MISSING_BODY: &str = "Missing body";

/// Body of `POST /point-ndvi`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest {
    pub bands: BandUrls,
    pub location: LonLat,
}

/// Body of `POST /zonal-ndvi`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonalRequest {
    pub bands: BandUrls,
    pub footprint: Footprint,
}

impl PointRequest {
    pub fn from_json(body: &Value) -> Result<Self, NdviError> {
        let fields = body_object(body)?;
        let bands = band_urls(fields)?;

        let lat = required(fields, "lat")?;
        let lon = required(fields, "lon")?;
        let lat = coordinate(lat, "lat", 90.0)?;
        let lon = coordinate(lon, "lon", 180.0)?;

        Ok(Self {
            bands,
            location: LonLat::new(lon, lat),
        })
    }

    pub fn query(&self) -> SpatialQuery {
        SpatialQuery::Point(self.location)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_params(
            band_params(&self.bands)
                .into_iter()
                .chain([("lat", json!(self.location.lat)), ("lon", json!(self.location.lon))]),
        )
    }
}

impl ZonalRequest {
    pub fn from_json(body: &Value) -> Result<Self, NdviError> {
        let fields = body_object(body)?;
        let bands = band_urls(fields)?;
        let footprint = Footprint::from_json(required(fields, "geojson")?)?;

        Ok(Self { bands, footprint })
    }

    pub fn query(&self) -> SpatialQuery {
        SpatialQuery::Zonal(self.footprint)
    }

    pub fn cache_key(&self) -> CacheKey {
        let ring: Vec<Value> = self
            .footprint
            .ring()
            .iter()
            .map(|v| json!([v.lon, v.lat]))
            .collect();

        CacheKey::from_params(
            band_params(&self.bands)
                .into_iter()
                .chain([("geojson", Value::Array(ring))]),
        )
    }
}

fn body_object(body: &Value) -> Result<&Map<String, Value>, NdviError> {
    body.as_object()
        .ok_or_else(|| NdviError::MissingInput(MISSING_BODY.to_string()))
}

/// A present, non-null field.
fn required<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value, NdviError> {
    match fields.get(name) {
        Some(Value::Null) | None => Err(NdviError::MissingInput(name.to_string())),
        Some(value) => Ok(value),
    }
}

fn url_field(fields: &Map<String, Value>, name: &str) -> Result<String, NdviError> {
    match required(fields, name)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(NdviError::MissingInput(format!("{} must be a non-empty URL", name))),
    }
}

fn band_urls(fields: &Map<String, Value>) -> Result<BandUrls, NdviError> {
    let missing: Vec<&str> = ["cog_red", "cog_nir", "cog_scl"]
        .into_iter()
        .filter(|name| matches!(fields.get(*name), None | Some(Value::Null)))
        .collect();
    if !missing.is_empty() {
        return Err(NdviError::MissingInput(missing.join(", ")));
    }

    Ok(BandUrls::new(
        url_field(fields, "cog_red")?,
        url_field(fields, "cog_nir")?,
        url_field(fields, "cog_scl")?,
    ))
}

fn band_params(bands: &BandUrls) -> [(&'static str, Value); 3] {
    [
        ("cog_red", json!(bands.red)),
        ("cog_nir", json!(bands.nir)),
        ("cog_scl", json!(bands.scl)),
    ]
}

fn coordinate(value: &Value, name: &str, limit: f64) -> Result<f64, NdviError> {
    let n = ndvi_common::geo::number_from_json(value)
        .ok_or_else(|| NdviError::InvalidCoordinate(format!("{} is not a number: {}", name, value)))?;

    if n.abs() > limit {
        return Err(NdviError::InvalidCoordinate(format!(
            "{} {} outside [-{}, {}]",
            name, n, limit, limit
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_body() -> Value {
        json!({
            "cog_red": "https://h/B04.tif",
            "cog_nir": "https://h/B08.tif",
            "cog_scl": "https://h/SCL.tif",
            "lat": 51.36,
            "lon": "7.46",
        })
    }

    fn zonal_body() -> Value {
        json!({
            "cog_red": "https://h/B04.tif",
            "cog_nir": "https://h/B08.tif",
            "cog_scl": "https://h/SCL.tif",
            "geojson": [[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]],
        })
    }

    #[test]
    fn test_point_parses_numeric_strings() {
        let request = PointRequest::from_json(&point_body()).unwrap();
        assert_eq!(request.location, LonLat::new(7.46, 51.36));
        assert_eq!(request.bands.scl, "https://h/SCL.tif");
    }

    #[test]
    fn test_point_key_independent_of_number_format() {
        let mut as_string = point_body();
        as_string["lat"] = json!("51.36");

        let a = PointRequest::from_json(&point_body()).unwrap().cache_key();
        let b = PointRequest::from_json(&as_string).unwrap().cache_key();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("cog_nir=https://h/B08.tif&cog_red="));
    }

    #[test]
    fn test_missing_body() {
        let err = PointRequest::from_json(&Value::Null).unwrap_err();
        assert_eq!(err, NdviError::MissingInput("Missing body".into()));

        let err = ZonalRequest::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, NdviError::MissingInput(_)));
    }

    #[test]
    fn test_missing_fields() {
        let mut body = point_body();
        body.as_object_mut().unwrap().remove("cog_nir");
        body.as_object_mut().unwrap().remove("cog_scl");
        let err = PointRequest::from_json(&body).unwrap_err();
        assert_eq!(err, NdviError::MissingInput("cog_nir, cog_scl".into()));

        let mut body = point_body();
        body["lat"] = Value::Null;
        let err = PointRequest::from_json(&body).unwrap_err();
        assert_eq!(err, NdviError::MissingInput("lat".into()));
    }

    #[test]
    fn test_empty_url_is_missing() {
        let mut body = point_body();
        body["cog_red"] = json!("  ");
        assert!(matches!(
            PointRequest::from_json(&body),
            Err(NdviError::MissingInput(_))
        ));
    }

    #[test]
    fn test_bad_coordinates() {
        let mut body = point_body();
        body["lon"] = json!("east");
        assert!(matches!(
            PointRequest::from_json(&body),
            Err(NdviError::InvalidCoordinate(_))
        ));

        let mut body = point_body();
        body["lat"] = json!(91.0);
        assert!(matches!(
            PointRequest::from_json(&body),
            Err(NdviError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_zonal_parses_ring() {
        let request = ZonalRequest::from_json(&zonal_body()).unwrap();
        assert_eq!(request.footprint.corners()[2], LonLat::new(1.0, 1.0));
        assert_eq!(request.query().kind(), "zonal");
    }

    #[test]
    fn test_zonal_key_serializes_ring() {
        let key = ZonalRequest::from_json(&zonal_body()).unwrap().cache_key();
        assert!(key
            .as_str()
            .contains("geojson=[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]"));
    }

    #[test]
    fn test_zonal_invalid_geometry() {
        let mut body = zonal_body();
        body["geojson"] = json!([[0, 0], [1, 0], [1, 1], [0, 1]]);
        assert!(matches!(
            ZonalRequest::from_json(&body),
            Err(NdviError::InvalidGeometry(_))
        ));

        let mut body = zonal_body();
        body.as_object_mut().unwrap().remove("geojson");
        assert_eq!(
            ZonalRequest::from_json(&body).unwrap_err(),
            NdviError::MissingInput("geojson".into())
        );
    }
}
