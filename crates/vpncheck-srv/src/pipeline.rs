//! The decision pipeline behind the endpoint.
//!
//! identity -> baseline -> cache -> lookup (known IP only) -> verdict

use axum::http::HeaderMap;
use std::time::Duration;
use tracing::{debug, warn};
use vpncheck_client::{IpapiClient, LookupCache};
use vpncheck_core::{
    compose, resolve_client_ip, Baseline, EdgeHeaderNames, EdgeMetadata, IpReport, IpapiResponse,
    LookupError,
};

/// Pipeline dependencies, shared by all requests
pub struct Pipeline {
    client: IpapiClient,
    cache: LookupCache,
    ttl: Duration,
    edge_headers: EdgeHeaderNames,
}

impl Pipeline {
    #[must_use]
    pub const fn new(
        client: IpapiClient,
        cache: LookupCache,
        ttl: Duration,
        edge_headers: EdgeHeaderNames,
    ) -> Self {
        Self {
            client,
            cache,
            ttl,
            edge_headers,
        }
    }

    /// Answer one request. Never fails: degradation is encoded in the report.
    pub async fn inspect(&self, headers: &HeaderMap) -> IpReport {
        let ip = resolve_client_ip(headers);
        let meta = EdgeMetadata::from_headers(headers, &self.edge_headers);
        let baseline = Baseline::compose(ip, &meta);

        let lookup = match baseline.ip.known() {
            Some(ip) => Some(self.lookup(ip).await),
            None => {
                debug!("client IP unknown, skipping external lookup");
                None
            }
        };

        if let Some(Err(err)) = &lookup {
            warn!(
                ip = %baseline.ip,
                kind = err.kind(),
                error = %err,
                "external lookup failed, using edge baseline"
            );
        }

        compose(&baseline, lookup.as_ref())
    }

    async fn lookup(&self, ip: &str) -> Result<IpapiResponse, LookupError> {
        self.cache
            .get_or_fetch(ip, self.ttl, || self.client.fetch(ip))
            .await?
            .decode()
    }
}
