//! ipapi.is lookup client.

use crate::error::ClientError;
use crate::response::RawHttpResponse;
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use vpncheck_core::{IpapiResponse, LookupError, Result};

/// The ipapi.is base URL
pub const DEFAULT_BASE_URL: &str = "https://api.ipapi.is";

/// Hard wall-clock bound for one lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4500);

/// Client for the external IP-intelligence API.
///
/// One call per lookup, no retries. Every failure comes back as a
/// [`LookupError`].
#[derive(Clone)]
pub struct IpapiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    api_key: Option<String>,
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for IpapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpapiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl IpapiClient {
    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> IpapiClientBuilder {
        IpapiClientBuilder::new()
    }

    /// Issue the outbound call and return the raw upstream answer.
    ///
    /// Any non-2xx status is returned as-is; only transport failures and the
    /// timeout are errors here.
    pub async fn fetch(&self, ip: &str) -> Result<RawHttpResponse> {
        let url = self.build_url(ip);
        debug!(ip = %ip, keyed = self.inner.api_key.is_some(), "ipapi lookup");

        let call = async {
            let response = self
                .inner
                .http
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;
            RawHttpResponse::read(response).await
        };

        // Dropping the future on expiry aborts the in-flight request.
        match tokio::time::timeout(self.inner.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(ip = %ip, timeout_ms = self.timeout_ms(), "ipapi lookup timed out");
                Err(LookupError::Timeout(self.timeout_ms()))
            }
        }
    }

    /// Fetch and decode in one step, without caching
    pub async fn lookup(&self, ip: &str) -> Result<IpapiResponse> {
        self.fetch(ip).await?.decode()
    }

    /// Build the request URL: `?q=<ip>` plus `&key=` only when configured
    fn build_url(&self, ip: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", ip);
            if let Some(key) = &self.inner.api_key {
                query.append_pair("key", key);
            }
        }
        url
    }

    fn transport_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.timeout_ms())
        } else {
            // Strip the URL: it carries the API key.
            LookupError::Transport(err.without_url().to_string())
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.inner.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Builder for configuring an [`IpapiClient`]
pub struct IpapiClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for IpapiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IpapiClientBuilder {
    /// Create a new builder with default settings and no API key
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("vpncheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the API key. Empty keys are ignored.
    #[must_use]
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the wall-clock bound for one lookup
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> std::result::Result<IpapiClient, ClientError> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;

        let http = HttpClient::builder()
            .connect_timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(IpapiClient {
            inner: Arc::new(ClientInner {
                http,
                api_key: self.api_key,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}
