//! Response emitter: report -> HTTP response.
//!
//! Always 200 with `cache-control: no-store`. Degradation lives in the body.

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;
use vpncheck_core::IpReport;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Caller-facing directive, independent of the edge cache leg
pub const CLIENT_CACHE_CONTROL: &str = "no-store";

const SERIALIZE_FALLBACK: &[u8] =
    br#"{"ok":true,"ip":"unknown","verdict":{"vpnLikely":false,"reason":"report unavailable"}}"#;

/// Serialize the report into the wire response.
#[must_use]
pub fn emit(report: &IpReport) -> Response {
    let body = serde_json::to_vec(report).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize report");
        SERIALIZE_FALLBACK.to_vec()
    });

    let mut response = (StatusCode::OK, Body::from(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CLIENT_CACHE_CONTROL));
    response
}
