//! End-to-end pipeline tests over in-memory rasters.

use std::sync::Arc;

use cog_reader::{MemoryRaster, MemoryRasterSource};
use ndvi_common::{Footprint, Georeference, LonLat, NdviError};
use ndvi_processor::{
    BandUrls, MedianMode, NdviOptions, NdviPipeline, SpatialQuery, WindowBuilder,
};
use serde_json::json;

const RED: &str = "mem://S2A_T32ULC/B04.tif";
const NIR: &str = "mem://S2A_T32ULC/B08.tif";
const SCL: &str = "mem://S2A_T32ULC/SCL.tif";

const VEGETATION: f32 = 4.0;
const CLOUD_HIGH: f32 = 9.0;

/// 12x12 reflectance grid of 0.1° pixels.
fn reflectance_georef() -> Georeference {
    Georeference::new((-0.05, 1.05), (0.1, -0.1), 4326)
}

/// 6x6 classification grid at half the resolution.
fn classification_georef() -> Georeference {
    Georeference::new((-0.05, 1.05), (0.2, -0.2), 4326)
}

fn scene(scl: Vec<f32>) -> Arc<MemoryRasterSource> {
    let source = MemoryRasterSource::new()
        .with_raster(RED, MemoryRaster::filled(12, 12, reflectance_georef(), 0.1))
        .with_raster(NIR, MemoryRaster::filled(12, 12, reflectance_georef(), 0.3))
        .with_raster(
            SCL,
            MemoryRaster::new(6, 6, classification_georef(), scl).unwrap(),
        );
    Arc::new(source)
}

fn all_vegetation() -> Vec<f32> {
    vec![VEGETATION; 36]
}

fn pipeline(source: Arc<MemoryRasterSource>, options: NdviOptions) -> NdviPipeline {
    NdviPipeline::new(source, WindowBuilder::default(), options)
}

fn bands() -> BandUrls {
    BandUrls::new(RED, NIR, SCL)
}

fn unit_square() -> SpatialQuery {
    let ring = json!([[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]);
    SpatialQuery::Zonal(Footprint::from_json(&ring).unwrap())
}

// ============================================================================
// Point queries
// ============================================================================

#[tokio::test]
async fn test_point_clear_sky() {
    let source = scene(all_vegetation());
    let pipeline = pipeline(source.clone(), NdviOptions::default());

    let query = SpatialQuery::Point(LonLat::new(0.52, 0.48));
    let result = pipeline.run(&query, &bands()).await.unwrap();

    assert_eq!(result.validity, 1.0);
    assert!((result.mean_ndvi.unwrap() - 0.5).abs() < 1e-6);
    assert!((result.median_ndvi.unwrap() - 0.5).abs() < 1e-6);
    assert!(result.reason.is_none());
    assert_eq!(source.open_count(), 3);
}

#[tokio::test]
async fn test_point_under_cloud() {
    // (0.52, 0.48) falls in classification pixel (2, 2)
    let mut scl = all_vegetation();
    scl[2 * 6 + 2] = CLOUD_HIGH;
    let pipeline = pipeline(scene(scl), NdviOptions::default());

    let query = SpatialQuery::Point(LonLat::new(0.52, 0.48));
    let result = pipeline.run(&query, &bands()).await.unwrap();

    assert_eq!(result.validity, 0.0);
    assert!(result.mean_ndvi.is_none());
    assert!(result.median_ndvi.is_none());
    assert_eq!(
        result.reason.as_deref(),
        Some("Cloud or shadow mask/ No valid pixel")
    );
}

#[tokio::test]
async fn test_point_outside_raster() {
    let pipeline = pipeline(scene(all_vegetation()), NdviOptions::default());

    let query = SpatialQuery::Point(LonLat::new(5.0, 5.0));
    let result = pipeline.run(&query, &bands()).await.unwrap();

    assert_eq!(result.validity, 0.0);
    assert!(result.mean_ndvi.is_none());
    assert!(result.reason.is_some());
}

// ============================================================================
// Zonal queries
// ============================================================================

#[tokio::test]
async fn test_zonal_partial_cloud() {
    // First classification column covers reflectance columns 0 and 1
    let mut scl = all_vegetation();
    for row in 0..6 {
        scl[row * 6] = CLOUD_HIGH;
    }
    let pipeline = pipeline(scene(scl), NdviOptions::default());

    let result = pipeline.run(&unit_square(), &bands()).await.unwrap();

    assert!((result.validity - 0.8).abs() < 1e-9);
    assert!((result.mean_ndvi.unwrap() - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_zonal_within_one_classification_pixel() {
    // Reflectance pixel (4, 4) sits inside classification pixel (2, 2),
    // whose own window from the footprint corners would be empty.
    let ring = json!([[0.36, 0.54], [0.46, 0.54], [0.46, 0.64], [0.36, 0.64], [0.36, 0.54]]);
    let query = SpatialQuery::Zonal(Footprint::from_json(&ring).unwrap());
    let pipeline = pipeline(scene(all_vegetation()), NdviOptions::default());

    let result = pipeline.run(&query, &bands()).await.unwrap();

    assert_eq!(result.validity, 1.0);
    assert!((result.mean_ndvi.unwrap() - 0.5).abs() < 1e-6);
    assert!(result.reason.is_none());
}

#[tokio::test]
async fn test_zonal_unaligned_mask() {
    // Reflectance window [5, 4, 9, 6] starts halfway through classification
    // column 2, so only reflectance column 5 lies under the cloud.
    let mut scl = all_vegetation();
    for row in 0..6 {
        scl[row * 6 + 2] = CLOUD_HIGH;
    }
    let ring = json!([[0.46, 0.44], [0.86, 0.44], [0.86, 0.64], [0.46, 0.64], [0.46, 0.44]]);
    let query = SpatialQuery::Zonal(Footprint::from_json(&ring).unwrap());
    let pipeline = pipeline(scene(scl), NdviOptions::default());

    let result = pipeline.run(&query, &bands()).await.unwrap();

    assert!((result.validity - 0.75).abs() < 1e-9);
    assert!((result.mean_ndvi.unwrap() - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_classification_with_shifted_origin() {
    // Classification grid shifted right by one reflectance pixel, so its
    // column 0 covers reflectance columns 1 and 2.
    let shifted = Georeference::new((0.05, 1.05), (0.2, -0.2), 4326);
    let mut scl = all_vegetation();
    for row in 0..6 {
        scl[row * 6] = CLOUD_HIGH;
    }
    let source = MemoryRasterSource::new()
        .with_raster(RED, MemoryRaster::filled(12, 12, reflectance_georef(), 0.1))
        .with_raster(NIR, MemoryRaster::filled(12, 12, reflectance_georef(), 0.3))
        .with_raster(SCL, MemoryRaster::new(6, 6, shifted, scl).unwrap());
    let pipeline = pipeline(Arc::new(source), NdviOptions::default());

    let result = pipeline.run(&unit_square(), &bands()).await.unwrap();

    // column 0 falls outside the classification raster, columns 1 and 2
    // are cloud: 30 of 100 pixels unusable
    assert!((result.validity - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn test_zonal_fully_masked() {
    let pipeline = pipeline(scene(vec![CLOUD_HIGH; 36]), NdviOptions::default());

    let result = pipeline.run(&unit_square(), &bands()).await.unwrap();

    assert_eq!(result.validity, 0.0);
    assert!(result.mean_ndvi.is_none());
    assert!(result.median_ndvi.is_none());
}

#[tokio::test]
async fn test_custom_excluded_classes() {
    let options = NdviOptions {
        excluded_classes: vec![4],
        median: MedianMode::Raw,
        ..NdviOptions::default()
    };
    let pipeline = pipeline(scene(all_vegetation()), options);

    let result = pipeline.run(&unit_square(), &bands()).await.unwrap();

    assert_eq!(result.validity, 0.0);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_band_is_upstream_error() {
    let pipeline = pipeline(scene(all_vegetation()), NdviOptions::default());
    let bands = BandUrls::new(RED, "mem://missing/B08.tif", SCL);

    let query = SpatialQuery::Point(LonLat::new(0.5, 0.5));
    let err = tokio_test::assert_err!(pipeline.run(&query, &bands).await);

    assert!(matches!(err, NdviError::UpstreamFetch(_)));
}

#[tokio::test]
async fn test_ungeoreferenced_raster() {
    let source = MemoryRasterSource::new()
        .with_raster(RED, MemoryRaster::filled(4, 4, Georeference::default(), 0.1))
        .with_raster(NIR, MemoryRaster::filled(4, 4, Georeference::default(), 0.3))
        .with_raster(SCL, MemoryRaster::filled(2, 2, Georeference::default(), 4.0));
    let pipeline = pipeline(Arc::new(source), NdviOptions::default());

    let query = SpatialQuery::Point(LonLat::new(0.5, 0.5));
    let err = pipeline.run(&query, &bands()).await.unwrap_err();

    assert!(matches!(err, NdviError::Georeference(_)));
}

#[tokio::test]
async fn test_signed_urls_resolve() {
    let pipeline = pipeline(scene(all_vegetation()), NdviOptions::default());
    let signed = bands().map(|url| format!("{}?st=2025-01-01&sig=abc", url));

    let query = SpatialQuery::Point(LonLat::new(0.52, 0.48));
    let result = tokio_test::assert_ok!(pipeline.run(&query, &signed).await);

    assert_eq!(result.validity, 1.0);
}
