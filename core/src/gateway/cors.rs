//! Static CORS and cache header values

use axum::http::{header, HeaderMap, HeaderValue};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
/// Preflight results may be cached for a day
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Objects are never rewritten in place, so responses can be cached forever
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Insert the CORS header set used on every gateway response
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
}
