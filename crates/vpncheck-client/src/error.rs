use thiserror::Error;

/// Errors raised while building an [`IpapiClient`](crate::IpapiClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL could not be parsed
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Http(String),
}

/// Errors from a [`ResponseCache`](crate::ResponseCache) backend.
///
/// Never fatal: a failed read is a miss and a failed write is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache store could not be reached
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
