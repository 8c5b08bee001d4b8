//! Error types for the vpncheck server.
//!
//! Only startup paths return these. Request handling is infallible.

use thiserror::Error;

/// Errors that can occur while starting or running the server.
#[derive(Error, Debug)]
pub enum SrvError {
    /// Configuration is invalid or could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Listener failed to bind or the server stopped with an error.
    #[error("http server error: {0}")]
    Server(String),

    /// Outbound client could not be built.
    #[error("lookup client error: {0}")]
    Client(#[from] vpncheck_client::ClientError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
