//! Outbound side of vpncheck.
//!
//! - [`IpapiClient`]: one bounded, cancellable call to ipapi.is
//! - [`LookupCache`]: cache-aside layer keyed by the resolved IP
//! - [`MemoryCache`]: in-process [`ResponseCache`] backend

mod cache;
mod client;
mod config;
mod error;
mod response;

pub use cache::{cache_key, edge_directive, LookupCache, MemoryCache, ResponseCache};
pub use client::{IpapiClient, IpapiClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use config::CachePolicy;
pub use error::{CacheError, ClientError};
pub use response::{RawHttpResponse, NO_STORE};
pub use vpncheck_core::{LookupError, Result};
