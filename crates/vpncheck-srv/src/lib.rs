//! vpncheck-srv: edge endpoint answering "what is the caller's network
//! identity, and is it likely a VPN/proxy/Tor/datacenter egress?"
//!
//! # Pipeline
//!
//! Each request runs independently:
//! - resolve the client IP from `CF-Connecting-IP` / `X-Forwarded-For`
//! - compose a baseline from edge metadata headers
//! - look the IP up at ipapi.is through a TTL cache (known IPs only)
//! - merge both into one JSON verdict
//!
//! The endpoint always answers 200 with `cache-control: no-store`. Lookup
//! failures show up in the body (`ipapi.ok: false`, `verdict.reason`).

pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod pipeline;
pub mod server;

// Re-exports for convenience.
pub use config::ServerConfig;
pub use error::SrvError;
pub use pipeline::Pipeline;

/// Result type for vpncheck-srv operations.
pub type Result<T> = std::result::Result<T, SrvError>;
