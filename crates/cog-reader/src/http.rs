//! HTTP byte-range client.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use tracing::debug;

use crate::error::{redact_url, CogError, Result};

/// Fetches byte ranges of remote files.
#[derive(Clone)]
pub struct RangeClient {
    client: Client,
}

impl RangeClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)))
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CogError::Http {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `length` bytes starting at `offset`.
    ///
    /// The result may be shorter than requested when the file ends first.
    /// Servers that ignore the Range header are tolerated by slicing the
    /// full body.
    pub async fn fetch_range(&self, url: &str, offset: u64, length: u64) -> Result<Bytes> {
        if length == 0 {
            return Ok(Bytes::new());
        }

        let end = offset + length - 1;
        let response = self
            .client
            .get(url)
            .header(header::RANGE, format!("bytes={}-{}", offset, end))
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        let body = match status {
            StatusCode::PARTIAL_CONTENT => {
                response.bytes().await.map_err(|e| transport_error(url, e))?
            }
            StatusCode::OK => {
                debug!(url = %redact_url(url), "Server ignored Range header");
                let full = response.bytes().await.map_err(|e| transport_error(url, e))?;
                let start = (offset as usize).min(full.len());
                let stop = (offset.saturating_add(length) as usize).min(full.len());
                full.slice(start..stop)
            }
            StatusCode::RANGE_NOT_SATISFIABLE => Bytes::new(),
            status => {
                return Err(CogError::HttpStatus {
                    url: redact_url(url),
                    status: status.as_u16(),
                })
            }
        };

        debug!(
            url = %redact_url(url),
            offset = offset,
            requested = length,
            received = body.len(),
            "Fetched byte range"
        );

        Ok(body)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> CogError {
    CogError::Http {
        url: redact_url(url),
        message: err.to_string(),
    }
}
