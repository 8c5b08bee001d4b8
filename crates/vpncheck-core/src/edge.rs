//! Connection metadata supplied by the edge platform.
//!
//! The edge terminates the client connection and knows its geo/ASN facts.
//! We treat those facts as trusted, but every one of them may be missing.

use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Per-connection facts attached by the edge. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    /// Two-letter country code
    #[serde(default)]
    pub country: Option<String>,

    /// Region/state name
    #[serde(default)]
    pub region: Option<String>,

    /// City name
    #[serde(default)]
    pub city: Option<String>,

    /// IANA timezone (e.g. "Europe/Belgrade")
    #[serde(default)]
    pub timezone: Option<String>,

    /// Autonomous system number
    #[serde(default)]
    pub asn: Option<u32>,

    /// Organization that owns the autonomous system
    #[serde(default)]
    pub as_organization: Option<String>,

    /// Edge flag for known anonymizing infrastructure
    #[serde(default)]
    pub is_anonymous_proxy: Option<bool>,
}

/// Names of the request headers the edge uses to carry [`EdgeMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeHeaderNames {
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_asn")]
    pub asn: String,

    #[serde(default = "default_as_organization")]
    pub as_organization: String,

    #[serde(default = "default_anonymous_proxy")]
    pub anonymous_proxy: String,
}

impl Default for EdgeHeaderNames {
    fn default() -> Self {
        Self {
            country: default_country(),
            region: default_region(),
            city: default_city(),
            timezone: default_timezone(),
            asn: default_asn(),
            as_organization: default_as_organization(),
            anonymous_proxy: default_anonymous_proxy(),
        }
    }
}

impl EdgeMetadata {
    /// Read edge metadata out of trusted request headers.
    ///
    /// Never fails: unreadable or empty values are treated as absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, names: &EdgeHeaderNames) -> Self {
        Self {
            country: header_text(headers, &names.country),
            region: header_text(headers, &names.region),
            city: header_text(headers, &names.city),
            timezone: header_text(headers, &names.timezone),
            asn: header_text(headers, &names.asn).and_then(|v| parse_asn(&v)),
            as_organization: header_text(headers, &names.as_organization),
            is_anonymous_proxy: header_text(headers, &names.anonymous_proxy)
                .map(|v| parse_flag(&v)),
        }
    }

    /// The anonymous-proxy flag with absent treated as false
    #[must_use]
    pub fn anonymous_proxy(&self) -> bool {
        self.is_anonymous_proxy.unwrap_or(false)
    }
}

/// Trimmed, non-empty UTF-8 value of a header.
pub(crate) fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parse "13335" or "AS13335".
fn parse_asn(value: &str) -> Option<u32> {
    let digits = value
        .strip_prefix("AS")
        .or_else(|| value.strip_prefix("as"))
        .unwrap_or(value);
    digits.parse().ok()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// Default header names, Cloudflare conventions.
fn default_country() -> String {
    String::from("cf-ipcountry")
}

fn default_region() -> String {
    String::from("cf-region")
}

fn default_city() -> String {
    String::from("cf-ipcity")
}

fn default_timezone() -> String {
    String::from("cf-timezone")
}

fn default_asn() -> String {
    String::from("cf-asn")
}

fn default_as_organization() -> String {
    String::from("cf-as-organization")
}

fn default_anonymous_proxy() -> String {
    String::from("cf-anonymous-proxy")
}
