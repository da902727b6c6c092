//! Request origin (`scheme://host`) used to build download URLs.

use axum::http::{header, HeaderMap, Uri};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Scheme of the request.
///
/// The server only speaks plain HTTP, so the scheme is `http` unless a
/// trusted proxy reports otherwise.
fn request_scheme(headers: &HeaderMap, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        if let Some(proto) = forwarded {
            return proto;
        }
    }
    "http".to_string()
}

/// Host of the request: the `Host` header, else the URI authority.
fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string())
}

/// `scheme://host` of the request, without a trailing slash.
pub fn base_url(headers: &HeaderMap, uri: &Uri, trust_proxy: bool) -> String {
    format!(
        "{}://{}",
        request_scheme(headers, trust_proxy),
        request_host(headers, uri)
    )
}
