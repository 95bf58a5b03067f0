//! Service configuration loading and types.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ndvi_processor::NdviOptions;
use serde::{Deserialize, Serialize};

/// Default Planetary Computer SAS token endpoint (collection is appended).
pub const DEFAULT_TOKEN_URL: &str = "https://planetarycomputer.microsoft.com/api/sas/v1/token";

/// Default STAC collection the rasters belong to.
pub const DEFAULT_COLLECTION: &str = "sentinel-2-l2a";

/// Service configuration, loaded from YAML with environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Response cache settings.
    pub cache: CacheConfig,

    /// Raster URL signing settings.
    pub token: TokenConfig,

    /// Outbound HTTP settings.
    pub http: HttpConfig,

    /// NDVI computation policy.
    pub ndvi: NdviOptions,
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses; 0 keeps every response for the
    /// lifetime of the process.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    10_000
}

/// Raster URL signing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Append a SAS token to every raster URL.
    pub enabled: bool,

    /// Token endpoint; the collection id is appended as a path segment.
    pub url: String,

    /// Collection the token is requested for.
    pub collection: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_TOKEN_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for each raster range request and token fetch.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServiceConfig {
    /// Load configuration from an optional YAML file, then apply
    /// environment overrides.
    ///
    /// A path that does not exist falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "Config file does not exist, using defaults"
                );
                Self::default()
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Loaded service config");
        Ok(config)
    }

    /// Override fields from environment variables when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("NDVI_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.cache.capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("NDVI_SIGN_URLS") {
            self.token.enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("NDVI_TOKEN_URL") {
            self.token.url = val;
        }

        if let Ok(val) = std::env::var("NDVI_TOKEN_COLLECTION") {
            self.token.collection = val;
        }

        if let Ok(val) = std::env::var("NDVI_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.http.timeout_secs = secs;
            }
        }

        self.ndvi = self.ndvi.with_env_overrides();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be > 0");
        }

        if self.token.enabled {
            if self.token.url.trim().is_empty() {
                bail!("token.url must be set when signing is enabled");
            }
            if self.token.collection.trim().is_empty() {
                bail!("token.collection must be set when signing is enabled");
            }
        }

        Ok(())
    }
}
