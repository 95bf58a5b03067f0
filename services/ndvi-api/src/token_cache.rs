//! SAS token acquisition, caching and URL signing.
//!
//! ## States
//! - `Empty`: no credential yet, or the last fetch failed
//! - `Valid`: a credential is held; usable while `now < expiry`
//! - `Refreshing`: one fetch is in flight; every caller awaits the same
//!   shared future
//!
//! The in-flight future moves the state to `Valid` on success and back to
//! `Empty` on failure, so a failed refresh is retried by the next caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use ndvi_common::NdviError;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

/// A SAS token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    #[serde(rename = "msft:expiry")]
    pub expiry: DateTime<Utc>,
    pub token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expiry,
        }
    }

    /// Usable strictly before `expiry`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }
}

/// Token fetch failures. Cloneable so every waiter on a shared fetch gets
/// the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Http(String),

    #[error("token endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed token response: {0}")]
    Malformed(String),
}

impl From<TokenError> for NdviError {
    fn from(err: TokenError) -> Self {
        NdviError::UpstreamFetch(err.to_string())
    }
}

/// Fetches credentials for a collection.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self, collection: &str) -> Result<Credential, TokenError>;
}

/// Planetary Computer SAS endpoint: `GET {base_url}/{collection}`.
pub struct PlanetaryComputerTokenProvider {
    client: reqwest::Client,
    base_url: String,
}

impl PlanetaryComputerTokenProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TokenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TokenError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), collection)
    }
}

#[async_trait]
impl TokenProvider for PlanetaryComputerTokenProvider {
    async fn fetch(&self, collection: &str) -> Result<Credential, TokenError> {
        let url = self.url(collection);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TokenError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenError::Status(response.status().as_u16()));
        }

        let credential: Credential = response
            .json()
            .await
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        tracing::info!(
            collection = collection,
            expiry = %credential.expiry,
            "Fetched SAS token"
        );

        Ok(credential)
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Credential, TokenError>>>;

enum TokenState {
    Empty,
    Valid(Credential),
    Refreshing(SharedFetch),
}

impl TokenState {
    fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Valid(_) => "valid",
            Self::Refreshing(_) => "refreshing",
        }
    }
}

/// Process-wide credential holder with single-flight refresh.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    collection: String,
    state: Arc<Mutex<TokenState>>,
    fetches: Arc<AtomicU64>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>, collection: impl Into<String>) -> Self {
        Self {
            provider,
            collection: collection.into(),
            state: Arc::new(Mutex::new(TokenState::Empty)),
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return a usable credential, fetching one if needed.
    ///
    /// Concurrent callers that find no usable credential share a single
    /// upstream fetch and all see its result.
    pub async fn credential(&self) -> Result<Credential, TokenError> {
        let fetch = {
            let mut state = self.state.lock().await;

            if let TokenState::Valid(credential) = &*state {
                if credential.is_usable_at(Utc::now()) {
                    return Ok(credential.clone());
                }
            }

            if let TokenState::Refreshing(fetch) = &*state {
                fetch.clone()
            } else {
                let fetch = self.start_fetch();
                *state = TokenState::Refreshing(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    fn start_fetch(&self) -> SharedFetch {
        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let fetches = Arc::clone(&self.fetches);
        let collection = self.collection.clone();

        async move {
            fetches.fetch_add(1, Ordering::Relaxed);
            let result = provider.fetch(&collection).await;

            let mut guard = state.lock().await;
            *guard = match &result {
                Ok(credential) => TokenState::Valid(credential.clone()),
                Err(e) => {
                    tracing::warn!(collection = %collection, error = %e, "SAS token fetch failed");
                    TokenState::Empty
                }
            };

            metrics::counter!(
                "ndvi_token_fetches_total",
                "outcome" => if result.is_ok() { "success" } else { "error" }
            )
            .increment(1);

            result
        }
        .boxed()
        .shared()
    }

    /// Number of upstream fetches started so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Current state name: `empty`, `valid` or `refreshing`.
    pub async fn state_name(&self) -> &'static str {
        self.state.lock().await.name()
    }

    /// Sign `url` with a usable credential.
    pub async fn sign(&self, url: &str) -> Result<String, TokenError> {
        let credential = self.credential().await?;
        Ok(sign_url(url, &credential.token))
    }
}

/// Append a SAS token to a URL as its query string.
pub fn sign_url(url: &str, token: &str) -> String {
    let token = token.trim_start_matches('?');
    if token.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, token)
}
