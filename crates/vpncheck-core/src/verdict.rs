//! Verdict composition: merge the baseline with the optional external lookup.
//!
//! [`compose`] is a pure, total function. The same inputs always produce the
//! same report.

use crate::baseline::Baseline;
use crate::error::LookupError;
use crate::types::{
    CloudflareSummary, CountryMismatch, IpReport, IpapiResponse, IpapiStatus, Justification,
    Source, Verdict,
};

pub const REASON_IP_UNKNOWN: &str = "IP unknown";
pub const REASON_EDGE_PROXY: &str = "Cloudflare anonymous proxy flag";
pub const REASON_UPSTREAM_UNAVAILABLE: &str = "ipapi unavailable";
pub const REASON_FETCH_FAILED: &str = "ipapi fetch failed";
pub const REASON_EDGE_PROXY_SIGNAL: &str = "cloudflare: isAnonymousProxy";
pub const REASON_NO_SIGNAL: &str = "no strong signal";

const FETCH_FAILED: &str = "fetch_failed";

/// Build the final report.
///
/// `lookup` is `None` when no external call was made. An unknown client IP
/// short-circuits to a baseline-only report no matter what `lookup` holds.
#[must_use]
pub fn compose(
    baseline: &Baseline,
    lookup: Option<&Result<IpapiResponse, LookupError>>,
) -> IpReport {
    if baseline.ip.is_unknown() {
        let reason = Justification::Reason(REASON_IP_UNKNOWN.into());
        return baseline_report(baseline, None, reason, false);
    }

    match lookup {
        Some(Ok(external)) => enriched_report(baseline, external),
        Some(Err(err)) => degraded_report(baseline, err),
        None => {
            let proxy = baseline.is_anonymous_proxy();
            let reason = if proxy {
                REASON_EDGE_PROXY
            } else {
                REASON_UPSTREAM_UNAVAILABLE
            };
            baseline_report(baseline, None, Justification::Reason(reason.into()), proxy)
        }
    }
}

fn degraded_report(baseline: &Baseline, err: &LookupError) -> IpReport {
    let proxy = baseline.is_anonymous_proxy();

    let (status, reason) = match err {
        LookupError::UpstreamStatus(code) => (
            IpapiStatus {
                ok: false,
                status: Some(*code),
                error: None,
                kind: None,
            },
            REASON_UPSTREAM_UNAVAILABLE,
        ),
        LookupError::Timeout(_) | LookupError::Transport(_) | LookupError::Decode(_) => (
            IpapiStatus {
                ok: false,
                status: None,
                error: Some(FETCH_FAILED),
                kind: Some(err.kind()),
            },
            REASON_FETCH_FAILED,
        ),
    };

    let reason = if proxy { REASON_EDGE_PROXY } else { reason };
    baseline_report(baseline, Some(status), Justification::Reason(reason.into()), proxy)
}

fn baseline_report(
    baseline: &Baseline,
    ipapi: Option<IpapiStatus>,
    justification: Justification,
    vpn_likely: bool,
) -> IpReport {
    IpReport {
        ok: true,
        ip: baseline.ip.clone(),
        source: Source::Edge,
        location: baseline.location.clone(),
        country: baseline.country.clone(),
        region: baseline.region.clone(),
        city: baseline.city.clone(),
        timezone: baseline.timezone.clone(),
        asn: baseline.asn.clone(),
        asn_type: None,
        as_organization: Some(baseline.as_organization.clone()),
        security: Some(baseline.security),
        flags: None,
        country_mismatch: None,
        cloudflare: edge_summary(baseline),
        ipapi,
        verdict: Verdict {
            vpn_likely,
            justification,
        },
    }
}

fn enriched_report(baseline: &Baseline, external: &IpapiResponse) -> IpReport {
    let flags = external.flags();
    let proxy = baseline.is_anonymous_proxy();

    let mut reasons: Vec<String> = flags
        .verdict_signals()
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| format!("ipapi: {name}"))
        .collect();
    if proxy {
        reasons.push(REASON_EDGE_PROXY_SIGNAL.into());
    }

    let vpn_likely = !reasons.is_empty();
    if reasons.is_empty() {
        reasons.push(REASON_NO_SIGNAL.into());
    }

    let country = external.country().map(String::from);

    IpReport {
        ok: true,
        ip: baseline.ip.clone(),
        source: Source::Enriched,
        location: external.location_display(),
        country_mismatch: country_mismatch(baseline.country.as_deref(), country.as_deref()),
        country,
        region: external.region().map(String::from),
        city: external.city().map(String::from),
        timezone: external.timezone().map(String::from),
        asn: external.asn_display(),
        asn_type: external.asn_type().map(String::from),
        as_organization: None,
        security: None,
        flags: Some(flags),
        cloudflare: edge_summary(baseline),
        ipapi: None,
        verdict: Verdict {
            vpn_likely,
            justification: Justification::Reasons(reasons),
        },
    }
}

fn edge_summary(baseline: &Baseline) -> CloudflareSummary {
    CloudflareSummary {
        location: baseline.location.clone(),
        country: baseline.country.clone(),
        asn: baseline.asn.clone(),
    }
}

/// Both countries present and different. Advisory only.
fn country_mismatch(edge: Option<&str>, external: Option<&str>) -> Option<CountryMismatch> {
    match (edge, external) {
        (Some(e), Some(x)) if e != x => Some(CountryMismatch {
            cloudflare_country: e.to_string(),
            ipapi_country: x.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeMetadata;
    use crate::identity::ClientIp;
    use crate::types::{IpapiLocation, IpapiSecurity, SecurityFlags};

    fn baseline(proxy: bool) -> Baseline {
        Baseline::compose(
            ClientIp::Known("198.51.100.20".into()),
            &EdgeMetadata {
                country: Some("RS".into()),
                city: Some("Novi Sad".into()),
                asn: Some(8400),
                as_organization: Some("Telekom Srbija".into()),
                is_anonymous_proxy: Some(proxy),
                ..EdgeMetadata::default()
            },
        )
    }

    fn external(sec: IpapiSecurity) -> IpapiResponse {
        IpapiResponse {
            location: Some(IpapiLocation {
                country_code: Some("NL".into()),
                city: Some("Amsterdam".into()),
                ..IpapiLocation::default()
            }),
            security: Some(sec),
            ..IpapiResponse::default()
        }
    }

    fn all_combinations() -> impl Iterator<Item = (IpapiSecurity, bool)> {
        (0u8..32).map(|bits| {
            (
                IpapiSecurity {
                    is_vpn: bits & 1 != 0,
                    is_proxy: bits & 2 != 0,
                    is_tor: bits & 4 != 0,
                    is_datacenter: bits & 8 != 0,
                    is_abuser: false,
                },
                bits & 16 != 0,
            )
        })
    }

    #[test]
    fn test_unknown_ip_short_circuits() {
        let base = Baseline::compose(ClientIp::Unknown, &EdgeMetadata::default());
        let security = IpapiSecurity {
            is_vpn: true,
            ..Default::default()
        };
        let report = compose(&base, Some(&Ok(external(security))));
        assert_eq!(report.source, Source::Edge);
        assert!(!report.verdict.vpn_likely);
        assert_eq!(report.verdict.justification, Justification::Reason("IP unknown".into()));
        assert_eq!(report.ip.as_str(), "unknown");
    }

    #[test]
    fn test_timeout_degrades_to_baseline() {
        let report = compose(&baseline(false), Some(&Err(LookupError::Timeout(4500))));
        assert_eq!(report.source, Source::Edge);
        assert!(!report.verdict.vpn_likely);
        assert_eq!(report.verdict.reasons(), ["ipapi fetch failed"]);
        let status = report.ipapi.unwrap();
        assert_eq!(status.error, Some("fetch_failed"));
        assert_eq!(status.kind, Some("timeout"));
        assert_eq!(report.location, "Novi Sad, RS");
    }

    #[test]
    fn test_upstream_status_degrades_to_baseline() {
        let report = compose(&baseline(false), Some(&Err(LookupError::UpstreamStatus(429))));
        assert_eq!(report.verdict.reasons(), ["ipapi unavailable"]);
        assert_eq!(report.ipapi.unwrap().status, Some(429));
    }

    #[test]
    fn test_failure_with_edge_proxy_flag() {
        for err in [
            LookupError::UpstreamStatus(503),
            LookupError::Transport("reset".into()),
            LookupError::Decode("eof".into()),
        ] {
            let report = compose(&baseline(true), Some(&Err(err)));
            assert!(report.verdict.vpn_likely);
            assert_eq!(report.verdict.reasons(), ["Cloudflare anonymous proxy flag"]);
        }
    }

    #[test]
    fn test_tor_only() {
        let report = compose(
            &baseline(false),
            Some(&Ok(external(IpapiSecurity { is_tor: true, ..Default::default() }))),
        );
        assert_eq!(report.source, Source::Enriched);
        assert!(report.verdict.vpn_likely);
        assert_eq!(
            report.verdict.justification,
            Justification::Reasons(vec!["ipapi: is_tor".into()])
        );
    }

    #[test]
    fn test_no_signal() {
        let report = compose(&baseline(false), Some(&Ok(external(IpapiSecurity::default()))));
        assert!(!report.verdict.vpn_likely);
        assert_eq!(report.verdict.reasons(), ["no strong signal"]);
    }

    #[test]
    fn test_reason_order() {
        let sec = IpapiSecurity {
            is_vpn: true,
            is_proxy: true,
            is_tor: true,
            is_datacenter: true,
            is_abuser: true,
        };
        let report = compose(&baseline(true), Some(&Ok(external(sec))));
        assert_eq!(
            report.verdict.reasons(),
            [
                "ipapi: is_vpn",
                "ipapi: is_proxy",
                "ipapi: is_tor",
                "ipapi: is_datacenter",
                "cloudflare: isAnonymousProxy",
            ]
        );
    }

    #[test]
    fn test_abuser_alone_is_not_vpn() {
        let report = compose(
            &baseline(false),
            Some(&Ok(external(IpapiSecurity { is_abuser: true, ..Default::default() }))),
        );
        assert!(!report.verdict.vpn_likely);
        assert!(report.flags.unwrap().is_abuser);
        assert_eq!(report.verdict.reasons(), ["no strong signal"]);
    }

    #[test]
    fn test_vpn_likely_iff_any_signal() {
        for (sec, proxy) in all_combinations() {
            let report = compose(&baseline(proxy), Some(&Ok(external(sec))));
            let expected = sec.is_vpn || sec.is_proxy || sec.is_tor || sec.is_datacenter || proxy;
            assert_eq!(report.verdict.vpn_likely, expected);
            assert!(!report.verdict.reasons().is_empty());
        }
    }

    #[test]
    fn test_vpn_likely_is_monotonic() {
        for (sec, proxy) in all_combinations() {
            let before = compose(&baseline(proxy), Some(&Ok(external(sec)))).verdict.vpn_likely;
            let raised = [
                (IpapiSecurity { is_vpn: true, ..sec }, proxy),
                (IpapiSecurity { is_proxy: true, ..sec }, proxy),
                (IpapiSecurity { is_tor: true, ..sec }, proxy),
                (IpapiSecurity { is_datacenter: true, ..sec }, proxy),
                (sec, true),
            ];
            for (s, p) in raised {
                let after = compose(&baseline(p), Some(&Ok(external(s)))).verdict.vpn_likely;
                assert!(!before || after);
            }
        }
    }

    #[test]
    fn test_compose_is_idempotent() {
        let base = baseline(true);
        let lookup = Ok(external(IpapiSecurity { is_vpn: true, ..Default::default() }));
        assert_eq!(compose(&base, Some(&lookup)), compose(&base, Some(&lookup)));
    }

    #[test]
    fn test_country_mismatch_is_advisory() {
        let report = compose(&baseline(false), Some(&Ok(external(IpapiSecurity::default()))));
        let mismatch = report.country_mismatch.unwrap();
        assert_eq!(mismatch.cloudflare_country, "RS");
        assert_eq!(mismatch.ipapi_country, "NL");
        assert!(!report.verdict.vpn_likely);
    }

    #[test]
    fn test_no_mismatch_when_either_missing() {
        let report = compose(&baseline(false), Some(&Ok(IpapiResponse::default())));
        assert!(report.country_mismatch.is_none());
        assert_eq!(report.location, "unknown");
        assert_eq!(report.flags, Some(SecurityFlags::default()));
    }

    #[test]
    fn test_enriched_fields_come_from_external_only() {
        let report = compose(&baseline(false), Some(&Ok(external(IpapiSecurity::default()))));
        assert_eq!(report.country.as_deref(), Some("NL"));
        assert_eq!(report.city.as_deref(), Some("Amsterdam"));
        assert_eq!(report.region, None);
        assert_eq!(report.asn, "unknown");
        assert_eq!(report.cloudflare.asn, "AS8400 Telekom Srbija");
        assert_eq!(report.cloudflare.country.as_deref(), Some("RS"));
    }

    #[test]
    fn test_wire_shape() {
        let security = IpapiSecurity {
            is_tor: true,
            ..Default::default()
        };
        let report = compose(&baseline(false), Some(&Ok(external(security))));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["source"], "ipapi+cloudflare");
        assert_eq!(json["verdict"]["vpnLikely"], true);
        assert_eq!(json["verdict"]["reasons"][0], "ipapi: is_tor");
        assert_eq!(json["flags"]["is_tor"], true);
        assert_eq!(json["countryMismatch"]["ipapiCountry"], "NL");
        assert!(json["asnType"].is_null());
        assert!(json.get("ipapi").is_none());
        assert!(json.get("asOrganization").is_none());

        let base = Baseline::compose(ClientIp::Unknown, &EdgeMetadata::default());
        let json = serde_json::to_value(compose(&base, None)).unwrap();
        assert_eq!(json["ip"], "unknown");
        assert_eq!(json["source"], "cloudflare");
        assert_eq!(
            json["verdict"],
            serde_json::json!({"vpnLikely": false, "reason": "IP unknown"})
        );
        assert_eq!(json["security"]["isAnonymousProxy"], false);
        assert!(json["asOrganization"].is_null());
        assert!(json.as_object().unwrap().contains_key("asOrganization"));
    }
}
