use serde::{Deserialize, Serialize};

use crate::baseline::{format_asn, format_location};
use crate::serde_utils;

/// Parsed subset of an ipapi.is lookup.
///
/// Every field is optional. Absent or null objects decode as `None`, absent
/// flags as `false`, and empty strings as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpapiResponse {
    #[serde(default)]
    pub location: Option<IpapiLocation>,

    #[serde(default)]
    pub asn: Option<IpapiAsn>,

    #[serde(default)]
    pub company: Option<IpapiCompany>,

    #[serde(default)]
    pub security: Option<IpapiSecurity>,
}

/// `location` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpapiLocation {
    /// ISO 3166-1 alpha-2 code, preferred over `country`
    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub country_code: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub timezone: Option<String>,
}

/// `asn` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpapiAsn {
    /// AS number, sent as a number or a string
    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub asn: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub org: Option<String>,

    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub name: Option<String>,

    /// hosting, isp, business, ...
    #[serde(default, rename = "type", deserialize_with = "serde_utils::text::deserialize")]
    pub kind: Option<String>,
}

/// `company` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpapiCompany {
    #[serde(default, deserialize_with = "serde_utils::text::deserialize")]
    pub name: Option<String>,

    #[serde(default, rename = "type", deserialize_with = "serde_utils::text::deserialize")]
    pub kind: Option<String>,
}

/// `security` object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct IpapiSecurity {
    #[serde(default, deserialize_with = "serde_utils::truthy::deserialize")]
    pub is_vpn: bool,

    #[serde(default, deserialize_with = "serde_utils::truthy::deserialize")]
    pub is_proxy: bool,

    #[serde(default, deserialize_with = "serde_utils::truthy::deserialize")]
    pub is_tor: bool,

    #[serde(default, deserialize_with = "serde_utils::truthy::deserialize")]
    pub is_datacenter: bool,

    #[serde(default, deserialize_with = "serde_utils::truthy::deserialize")]
    pub is_abuser: bool,
}

/// Normalized security flags as reported on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SecurityFlags {
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub is_datacenter: bool,
    pub is_abuser: bool,
}

impl From<IpapiSecurity> for SecurityFlags {
    fn from(sec: IpapiSecurity) -> Self {
        Self {
            is_vpn: sec.is_vpn,
            is_proxy: sec.is_proxy,
            is_tor: sec.is_tor,
            is_datacenter: sec.is_datacenter,
            is_abuser: sec.is_abuser,
        }
    }
}

impl SecurityFlags {
    /// Flags that count toward the VPN verdict, in reporting order.
    ///
    /// `is_abuser` is reported in `flags` but never counts.
    #[must_use]
    pub const fn verdict_signals(&self) -> [(&'static str, bool); 4] {
        [
            ("is_vpn", self.is_vpn),
            ("is_proxy", self.is_proxy),
            ("is_tor", self.is_tor),
            ("is_datacenter", self.is_datacenter),
        ]
    }
}

impl IpapiResponse {
    fn loc(&self) -> Option<&IpapiLocation> {
        self.location.as_ref()
    }

    /// `location.country_code`, else `location.country`
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.loc()
            .and_then(|l| l.country_code.as_deref().or(l.country.as_deref()))
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.loc().and_then(|l| l.region.as_deref())
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.loc().and_then(|l| l.city.as_deref())
    }

    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.loc().and_then(|l| l.timezone.as_deref())
    }

    /// "City, Region, CC (Timezone)" or "unknown"
    #[must_use]
    pub fn location_display(&self) -> String {
        format_location(self.city(), self.region(), self.country(), self.timezone())
    }

    /// "AS<n>" label
    #[must_use]
    pub fn asn_label(&self) -> Option<String> {
        self.asn.as_ref().and_then(|a| a.asn.as_deref()).map(|n| {
            if n.starts_with("AS") {
                n.to_string()
            } else {
                format!("AS{n}")
            }
        })
    }

    /// `asn.org`, else `asn.name`, else `company.name`
    #[must_use]
    pub fn asn_name(&self) -> Option<&str> {
        let asn = self.asn.as_ref();
        asn.and_then(|a| a.org.as_deref())
            .or_else(|| asn.and_then(|a| a.name.as_deref()))
            .or_else(|| self.company.as_ref().and_then(|c| c.name.as_deref()))
    }

    /// `company.type`, else `asn.type`
    #[must_use]
    pub fn asn_type(&self) -> Option<&str> {
        self.company
            .as_ref()
            .and_then(|c| c.kind.as_deref())
            .or_else(|| self.asn.as_ref().and_then(|a| a.kind.as_deref()))
    }

    /// "AS<n> <name>" or "unknown"
    #[must_use]
    pub fn asn_display(&self) -> String {
        format_asn(self.asn_label().as_deref(), self.asn_name())
    }

    /// Security flags, absent meaning false
    #[must_use]
    pub fn flags(&self) -> SecurityFlags {
        self.security.unwrap_or_default().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ip": "185.65.135.1",
        "location": {
            "country": "Sweden",
            "country_code": "SE",
            "region": "Stockholm",
            "city": "Stockholm",
            "timezone": "Europe/Stockholm",
            "latitude": 59.3
        },
        "asn": { "asn": 39351, "org": "31173 Services AB", "type": "hosting" },
        "company": { "name": "Mullvad VPN AB", "type": "business" },
        "security": {
            "is_vpn": true,
            "is_proxy": false,
            "is_tor": false,
            "is_datacenter": true,
            "is_abuser": true,
            "is_bogon": false
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let resp: IpapiResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(resp.country(), Some("SE"));
        assert_eq!(resp.location_display(), "Stockholm, Stockholm, SE (Europe/Stockholm)");
        assert_eq!(resp.asn_display(), "AS39351 31173 Services AB");
        assert_eq!(resp.asn_type(), Some("business"));

        let flags = resp.flags();
        assert!(flags.is_vpn && flags.is_datacenter && flags.is_abuser);
        assert!(!flags.is_proxy && !flags.is_tor);
    }

    #[test]
    fn test_empty_object() {
        let resp: IpapiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.country(), None);
        assert_eq!(resp.location_display(), "unknown");
        assert_eq!(resp.asn_display(), "unknown");
        assert_eq!(resp.asn_type(), None);
        assert_eq!(resp.flags(), SecurityFlags::default());
    }

    #[test]
    fn test_null_objects() {
        let resp: IpapiResponse =
            serde_json::from_str(r#"{"location": null, "asn": null, "security": null}"#).unwrap();
        assert_eq!(resp, IpapiResponse::default());
    }

    #[test]
    fn test_country_falls_back_to_name() {
        let resp: IpapiResponse =
            serde_json::from_str(r#"{"location": {"country": "Germany", "country_code": ""}}"#)
                .unwrap();
        assert_eq!(resp.country(), Some("Germany"));
    }

    #[test]
    fn test_asn_name_precedence() {
        let resp: IpapiResponse = serde_json::from_str(
            r#"{
                "asn": {"asn": "AS64500", "name": "Example Net"},
                "company": {"name": "Example Co"}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.asn_display(), "AS64500 Example Net");

        let resp: IpapiResponse =
            serde_json::from_str(r#"{"company": {"name": "Example Co"}}"#).unwrap();
        assert_eq!(resp.asn_display(), "Example Co");
    }

    #[test]
    fn test_asn_type_prefers_company() {
        let resp: IpapiResponse = serde_json::from_str(
            r#"{"asn": {"type": "hosting"}, "company": {"type": "isp"}}"#,
        )
        .unwrap();
        assert_eq!(resp.asn_type(), Some("isp"));

        let resp: IpapiResponse =
            serde_json::from_str(r#"{"asn": {"type": "hosting"}, "company": {}}"#).unwrap();
        assert_eq!(resp.asn_type(), Some("hosting"));
    }

    #[test]
    fn test_abuser_not_a_verdict_signal() {
        let flags = SecurityFlags {
            is_abuser: true,
            ..SecurityFlags::default()
        };
        assert!(flags.verdict_signals().iter().all(|(_, on)| !on));
    }

    #[test]
    fn test_non_object_is_error() {
        assert!(serde_json::from_str::<IpapiResponse>("[1, 2]").is_err());
        assert!(serde_json::from_str::<IpapiResponse>("not json").is_err());
    }
}
