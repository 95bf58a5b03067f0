//! Application state and shared resources.

use std::sync::Arc;

use anyhow::{Context, Result};
use cog_reader::{HttpCogSource, RasterSource};
use metrics_exporter_prometheus::PrometheusHandle;
use ndvi_common::NdviError;
use ndvi_processor::{BandUrls, NdviPipeline, WindowBuilder};

use crate::config::ServiceConfig;
use crate::metrics::MetricsCollector;
use crate::request_cache::RequestCache;
use crate::token_cache::{PlanetaryComputerTokenProvider, TokenCache, TokenProvider};

/// Shared application state. Created once at startup.
pub struct AppState {
    pub config: ServiceConfig,
    pub pipeline: NdviPipeline,
    pub request_cache: RequestCache,
    /// `None` when URL signing is disabled.
    pub token_cache: Option<TokenCache>,
    pub metrics: MetricsCollector,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state backed by HTTP range reads and the configured token endpoint.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let timeout = config.http.timeout();

        let source = HttpCogSource::new(timeout).context("Failed to create raster HTTP client")?;

        let provider = if config.token.enabled {
            let provider = PlanetaryComputerTokenProvider::new(config.token.url.clone(), timeout)
                .context("Failed to create token HTTP client")?;
            Some(Arc::new(provider) as Arc<dyn TokenProvider>)
        } else {
            None
        };

        Ok(Self::with_components(config, Arc::new(source), provider))
    }

    /// Build state from explicit components.
    ///
    /// A `None` provider disables signing regardless of `config.token.enabled`.
    pub fn with_components(
        config: ServiceConfig,
        source: Arc<dyn RasterSource>,
        provider: Option<Arc<dyn TokenProvider>>,
    ) -> Self {
        let pipeline = NdviPipeline::new(source, WindowBuilder::default(), config.ndvi.clone());
        let request_cache = RequestCache::new(config.cache.capacity);
        let token_cache =
            provider.map(|provider| TokenCache::new(provider, config.token.collection.clone()));

        tracing::info!(
            cache_capacity = config.cache.capacity,
            signing = token_cache.is_some(),
            excluded_classes = ?config.ndvi.excluded_classes,
            median = %config.ndvi.median,
            "Application state initialized"
        );

        Self {
            config,
            pipeline,
            request_cache,
            token_cache,
            metrics: MetricsCollector::new(),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Sign the band URLs when signing is enabled; otherwise return them as is.
    pub async fn sign(&self, bands: &BandUrls) -> Result<BandUrls, NdviError> {
        let Some(tokens) = &self.token_cache else {
            return Ok(bands.clone());
        };

        let credential = tokens.credential().await?;
        Ok(bands.map(|url| crate::token_cache::sign_url(url, &credential.token)))
    }
}
