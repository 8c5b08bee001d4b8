//! Baseline record composed purely from edge connection metadata.

use serde::Serialize;

use crate::edge::EdgeMetadata;
use crate::identity::ClientIp;

/// Display value used whenever nothing better is known
pub const UNKNOWN: &str = "unknown";

/// Security facts the edge knows about the connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSecurity {
    pub is_anonymous_proxy: bool,
}

/// Best-effort geo/ASN record from trusted edge metadata.
///
/// Construction never fails; missing inputs degrade to `None` or `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    /// Resolved client address
    pub ip: ClientIp,

    /// "City, Region, CC (Timezone)" or "unknown"
    pub location: String,

    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,

    /// "AS<n> <org>" or "unknown"
    pub asn: String,

    /// Raw AS number
    pub asn_number: Option<u32>,

    /// Raw AS organization
    pub as_organization: Option<String>,

    pub security: BaselineSecurity,
}

impl Baseline {
    /// Compose the baseline for a resolved address and its edge metadata
    #[must_use]
    pub fn compose(ip: ClientIp, meta: &EdgeMetadata) -> Self {
        let asn_label = meta.asn.map(|n| format!("AS{n}"));

        Self {
            ip,
            location: format_location(
                meta.city.as_deref(),
                meta.region.as_deref(),
                meta.country.as_deref(),
                meta.timezone.as_deref(),
            ),
            country: meta.country.clone(),
            region: meta.region.clone(),
            city: meta.city.clone(),
            timezone: meta.timezone.clone(),
            asn: format_asn(asn_label.as_deref(), meta.as_organization.as_deref()),
            asn_number: meta.asn,
            as_organization: meta.as_organization.clone(),
            security: BaselineSecurity {
                is_anonymous_proxy: meta.anonymous_proxy(),
            },
        }
    }

    /// Edge anonymous-proxy flag
    #[must_use]
    pub const fn is_anonymous_proxy(&self) -> bool {
        self.security.is_anonymous_proxy
    }
}

/// Join city/region/country with ", " and append the timezone in parentheses.
///
/// Returns exactly `"unknown"` when none of city, region or country is set.
#[must_use]
pub fn format_location(
    city: Option<&str>,
    region: Option<&str>,
    country: Option<&str>,
    timezone: Option<&str>,
) -> String {
    let parts: Vec<&str> = [city, region, country]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return UNKNOWN.to_string();
    }

    let joined = parts.join(", ");
    match timezone.filter(|tz| !tz.is_empty()) {
        Some(tz) => format!("{joined} ({tz})"),
        None => joined,
    }
}

/// Join an "AS<n>" label and an organization name with a space, or `"unknown"`.
#[must_use]
pub fn format_asn(label: Option<&str>, name: Option<&str>) -> String {
    let parts: Vec<&str> = [label, name]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        UNKNOWN.to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_meta() -> EdgeMetadata {
        EdgeMetadata {
            country: Some("RS".into()),
            region: Some("Central Serbia".into()),
            city: Some("Belgrade".into()),
            timezone: Some("Europe/Belgrade".into()),
            asn: Some(8400),
            as_organization: Some("Telekom Srbija".into()),
            is_anonymous_proxy: Some(false),
        }
    }

    #[test]
    fn test_compose_full() {
        let baseline = Baseline::compose(ClientIp::Known("1.2.3.4".into()), &full_meta());
        assert_eq!(
            baseline.location,
            "Belgrade, Central Serbia, RS (Europe/Belgrade)"
        );
        assert_eq!(baseline.asn, "AS8400 Telekom Srbija");
        assert_eq!(baseline.country.as_deref(), Some("RS"));
        assert!(!baseline.is_anonymous_proxy());
    }

    #[test]
    fn test_compose_empty_never_fails() {
        let baseline = Baseline::compose(ClientIp::Unknown, &EdgeMetadata::default());
        assert_eq!(baseline.location, "unknown");
        assert_eq!(baseline.asn, "unknown");
        assert!(baseline.country.is_none());
        assert!(baseline.timezone.is_none());
        assert!(!baseline.is_anonymous_proxy());
    }

    #[test]
    fn test_location_unknown_iff_no_place_parts() {
        let tz_only = EdgeMetadata {
            timezone: Some("UTC".into()),
            ..EdgeMetadata::default()
        };
        assert_eq!(Baseline::compose(ClientIp::Unknown, &tz_only).location, "unknown");

        let country_only = EdgeMetadata {
            country: Some("DE".into()),
            ..EdgeMetadata::default()
        };
        assert_eq!(Baseline::compose(ClientIp::Unknown, &country_only).location, "DE");
    }

    #[test]
    fn test_partial_asn() {
        let number_only = EdgeMetadata {
            asn: Some(13335),
            ..EdgeMetadata::default()
        };
        assert_eq!(Baseline::compose(ClientIp::Unknown, &number_only).asn, "AS13335");

        let org_only = EdgeMetadata {
            as_organization: Some("Cloudflare".into()),
            ..EdgeMetadata::default()
        };
        assert_eq!(Baseline::compose(ClientIp::Unknown, &org_only).asn, "Cloudflare");
    }

    #[test]
    fn test_anonymous_proxy_cast() {
        let meta = EdgeMetadata {
            is_anonymous_proxy: Some(true),
            ..EdgeMetadata::default()
        };
        assert!(Baseline::compose(ClientIp::Unknown, &meta).is_anonymous_proxy());
    }

    #[test]
    fn test_format_location_skips_missing_middle() {
        assert_eq!(
            format_location(Some("Paris"), None, Some("FR"), None),
            "Paris, FR"
        );
    }
}
