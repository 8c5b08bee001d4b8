//! Core types and pure pipeline stages for vpncheck.
//!
//! Everything here is I/O free:
//!
//! - **Identity**: resolve the client address from request headers
//! - **Baseline**: geo/ASN record from trusted edge metadata
//! - **Types**: the upstream ipapi.is model and the response report
//! - **Verdict**: merge baseline and lookup into one [`IpReport`]
//!
//! # Example
//!
//! ```rust,ignore
//! use vpncheck_core::{resolve_client_ip, Baseline, EdgeMetadata, EdgeHeaderNames, compose};
//!
//! let ip = resolve_client_ip(&headers);
//! let meta = EdgeMetadata::from_headers(&headers, &EdgeHeaderNames::default());
//! let baseline = Baseline::compose(ip, &meta);
//! let report = compose(&baseline, None);
//! ```

mod baseline;
mod edge;
mod error;
mod identity;
mod serde_utils;
pub mod types;
pub mod verdict;

pub use baseline::{format_asn, format_location, Baseline, BaselineSecurity, UNKNOWN};
pub use edge::{EdgeHeaderNames, EdgeMetadata};
pub use error::{LookupError, Result};
pub use identity::{
    resolve_client_ip, ClientIp, CONNECTING_IP_HEADER, FORWARDED_FOR_HEADER, UNKNOWN_IP,
};
pub use types::*;
pub use verdict::compose;
