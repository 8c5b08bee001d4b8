//! Raw upstream response as carried through the cache.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH};
use http::StatusCode;
use vpncheck_core::{IpapiResponse, LookupError, Result};

/// Cache directive on everything handed back to the pipeline
pub const NO_STORE: &str = "no-store";

/// Upstream status, content headers and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawHttpResponse {
    /// Create a response with no headers
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Read status, content headers and the full body off a reqwest response
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = content_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::Transport(e.without_url().to_string()))?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Returns true for 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The current `cache-control` directive, if any
    #[must_use]
    pub fn cache_control(&self) -> Option<&str> {
        self.headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok())
    }

    /// Replace the `cache-control` directive
    #[must_use]
    pub fn with_cache_control(mut self, directive: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(directive) {
            self.headers.insert(CACHE_CONTROL, value);
        }
        self
    }

    /// Parse the body as an ipapi.is answer.
    ///
    /// Non-2xx statuses become [`LookupError::UpstreamStatus`] without the
    /// body being looked at.
    pub fn decode(&self) -> Result<IpapiResponse> {
        if !self.is_success() {
            return Err(LookupError::UpstreamStatus(self.status.as_u16()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Keep `content-*` headers that still describe the decoded body.
fn content_headers(upstream: &HeaderMap) -> HeaderMap {
    upstream
        .iter()
        .filter(|(name, _)| {
            name.as_str().starts_with("content-")
                && **name != CONTENT_LENGTH
                && **name != CONTENT_ENCODING
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
