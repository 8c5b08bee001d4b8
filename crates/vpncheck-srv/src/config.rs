//! Server configuration for vpncheck.
//!
//! The ipapi.is key is deliberately absent: it only comes from the
//! environment or the command line.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use vpncheck_client::CachePolicy;
use vpncheck_core::EdgeHeaderNames;

/// Configuration for a vpncheck endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address (default: 0.0.0.0:8787).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Path the endpoint answers on (default: /api/ip).
    #[serde(default = "default_route")]
    pub route: String,

    /// External lookup settings.
    #[serde(default)]
    pub ipapi: IpapiConfig,

    /// Lookup cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Headers carrying edge connection metadata.
    #[serde(default)]
    pub edge_headers: EdgeHeaderNames,
}

/// External lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpapiConfig {
    /// API base URL (default: https://api.ipapi.is).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hard bound on one lookup in milliseconds (default: 4500).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Lookup cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Edge-side TTL in seconds (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum in-process entries (default: 10000).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            route: default_route(),
            ipapi: IpapiConfig::default(),
            cache: CacheConfig::default(),
            edge_headers: EdgeHeaderNames::default(),
        }
    }
}

impl Default for IpapiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl IpapiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        CachePolicy::new()
            .ttl(Duration::from_secs(self.ttl_secs))
            .max_entries(self.max_entries)
    }
}

impl ServerConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::SrvError::Config(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.route.starts_with('/') {
            return Err(crate::SrvError::Config(format!(
                "route must start with '/': {}",
                self.route
            )));
        }
        if self.ipapi.timeout_ms == 0 {
            return Err(crate::SrvError::Config("ipapi.timeout_ms must be > 0".into()));
        }
        let max_ttl = CachePolicy::MAX_TTL.as_secs();
        if self.cache.ttl_secs > max_ttl {
            return Err(crate::SrvError::Config(format!(
                "cache.ttl_secs must be <= {max_ttl}: {}",
                self.cache.ttl_secs
            )));
        }
        Ok(())
    }
}

// Default value functions for serde.
fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}

fn default_route() -> String {
    String::from("/api/ip")
}

fn default_base_url() -> String {
    String::from(vpncheck_client::DEFAULT_BASE_URL)
}

const fn default_timeout_ms() -> u64 {
    4500
}

const fn default_ttl_secs() -> u64 {
    300
}

const fn default_max_entries() -> usize {
    10_000
}
