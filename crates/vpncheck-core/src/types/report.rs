use serde::Serialize;

use super::SecurityFlags;
use crate::baseline::BaselineSecurity;
use crate::identity::ClientIp;

/// Which signal sources went into a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    /// Edge metadata only
    #[serde(rename = "cloudflare")]
    Edge,
    /// External lookup merged with edge metadata
    #[serde(rename = "ipapi+cloudflare")]
    Enriched,
}

/// The final VPN judgment.
///
/// Serialized as `{vpnLikely, reason}` for baseline-only reports and
/// `{vpnLikely, reasons}` for enriched ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    #[serde(rename = "vpnLikely")]
    pub vpn_likely: bool,

    #[serde(flatten)]
    pub justification: Justification,
}

/// Why the verdict came out the way it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    /// Single fixed reason (degraded path)
    Reason(String),
    /// One entry per contributing signal, in fixed order
    Reasons(Vec<String>),
}

impl Verdict {
    /// All reasons as a slice, regardless of wire shape
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        match &self.justification {
            Justification::Reason(r) => std::slice::from_ref(r),
            Justification::Reasons(rs) => rs,
        }
    }
}

/// Edge view kept alongside an enriched report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudflareSummary {
    pub location: String,
    pub country: Option<String>,
    pub asn: String,
}

/// Advisory: edge and external disagree about the country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryMismatch {
    pub cloudflare_country: String,
    pub ipapi_country: String,
}

/// Lookup failure encoded as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpapiStatus {
    pub ok: bool,

    /// Upstream HTTP status for non-2xx answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,

    /// timeout, transport or decode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// Normalized response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpReport {
    pub ok: bool,
    pub ip: ClientIp,
    pub source: Source,
    pub location: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub asn: String,
    pub asn_type: Option<String>,

    /// Present (possibly null) on baseline-only reports
    #[allow(clippy::option_option)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_organization: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<BaselineSecurity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<SecurityFlags>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_mismatch: Option<CountryMismatch>,

    pub cloudflare: CloudflareSummary,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipapi: Option<IpapiStatus>,

    pub verdict: Verdict,
}
