//! Client IP resolution from request headers.
//!
//! The resolved value is an opaque lookup/cache key. It is NOT validated as
//! an IP address: whatever the headers say is passed through.

use http::HeaderMap;
use serde::{Serialize, Serializer};

use crate::edge::header_text;

/// Header injected by the edge with the address of the connecting client.
pub const CONNECTING_IP_HEADER: &str = "cf-connecting-ip";

/// Standard proxy chain header. Untrusted; only its first entry is used.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Sentinel reported when no client address could be found.
pub const UNKNOWN_IP: &str = "unknown";

/// The caller's address as far as the headers tell us
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientIp {
    /// A header produced a value
    Known(String),
    /// Nothing usable in the headers
    Unknown,
}

impl ClientIp {
    /// The address, or `"unknown"`
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(ip) => ip,
            Self::Unknown => UNKNOWN_IP,
        }
    }

    /// Returns the address if one was resolved
    #[must_use]
    pub fn known(&self) -> Option<&str> {
        match self {
            Self::Known(ip) => Some(ip),
            Self::Unknown => None,
        }
    }

    /// Returns true if no address was resolved
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ClientIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClientIp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolve the client address.
///
/// Precedence: the edge's connecting-IP header, then the first trimmed entry
/// of `X-Forwarded-For`, then [`ClientIp::Unknown`]. A header whose value is
/// literally `unknown` does not count.
#[must_use]
pub fn resolve_client_ip(headers: &HeaderMap) -> ClientIp {
    header_text(headers, CONNECTING_IP_HEADER)
        .or_else(|| {
            header_text(headers, FORWARDED_FOR_HEADER).and_then(|chain| {
                chain
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|first| !first.is_empty())
                    .map(String::from)
            })
        })
        .filter(|ip| ip != UNKNOWN_IP)
        .map_or(ClientIp::Unknown, ClientIp::Known)
}
