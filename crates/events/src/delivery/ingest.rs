//! Reading ingestion over HTTP.
//!
//! [`HttpForwarder`] POSTs one JSON-encoded [`Reading`] per call to the
//! ingestion endpoint. There is no retry: a failed reading is logged by
//! the caller and superseded by the next sample.

use std::time::Duration;

use async_trait::async_trait;
use motorwatch_core::Reading;

use super::Forwarder;

/// HTTP request timeout for a single submission. Must stay below the
/// sampling period.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1500);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for ingestion failures.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a 4xx/5xx status.
    #[error("Ingestion endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// HttpForwarder
// ---------------------------------------------------------------------------

/// Forwards readings to a fixed ingestion URL.
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
}

impl HttpForwarder {
    /// Create a forwarder with the default request timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, IngestError> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward_reading(&self, reading: &Reading) -> Result<(), IngestError> {
        let response = self.client.post(&self.url).json(reading).send().await?;
        let status = response.status();

        tracing::debug!(
            sensor = %reading.sensor_id,
            value = reading.value,
            unit = %reading.unit,
            status = status.as_u16(),
            "Reading submitted"
        );

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
