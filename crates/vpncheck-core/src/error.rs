use thiserror::Error;

/// Result type alias for external lookups
pub type Result<T> = std::result::Result<T, LookupError>;

/// Ways the external intelligence lookup can fail.
///
/// None of these are fatal to the request: the verdict composer treats every
/// variant as "no external data available" and degrades to the baseline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The wall-clock bound elapsed and the in-flight call was dropped
    #[error("lookup timed out after {0} ms")]
    Timeout(u64),

    /// DNS, connect, reset or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status; the body was not parsed
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    /// 2xx response whose body is not the expected JSON
    #[error("malformed upstream JSON: {0}")]
    Decode(String),
}

impl LookupError {
    /// Short machine-readable name of the failure kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
