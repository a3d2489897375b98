//! Header rules shared by the request path, the record path and snapshots.
//!
//! Upstream responses carry internal diagnostic headers (`X-GDC-*`) and a
//! `Date` that must never reach clients or stub files; bodies are
//! decompressed before they are relayed, so encoding and length headers are
//! dropped as well.

use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::Response;

const INTERNAL_HEADER_PREFIX: &str = "x-gdc";

static VALUE_GZIP: HeaderValue = HeaderValue::from_static("gzip");

/// `X-GDC*` or `Date`: never relayed, never recorded.
pub fn is_internal_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with(INTERNAL_HEADER_PREFIX) || lower == "date"
}

/// Headers dropped when relaying a decompressed upstream response.
pub fn is_relay_excluded(name: &str) -> bool {
    is_internal_header(name)
        || name.eq_ignore_ascii_case("content-encoding")
        || name.eq_ignore_ascii_case("content-length")
}

/// Headers dropped when turning an upstream response into a stub.
pub fn is_snapshot_excluded(name: &str) -> bool {
    is_relay_excluded(name)
        || name.eq_ignore_ascii_case("connection")
        || name.eq_ignore_ascii_case("transfer-encoding")
}

/// Rewrite inbound request headers before matching or forwarding.
///
/// With an upstream configured, `Origin` and `Referer` are pointed at it so
/// recorded stubs and replayed requests agree. `Accept-Encoding` is always
/// forced to gzip.
pub fn transform_request_headers(
    headers: &mut HeaderMap,
    proxy_host: Option<&str>,
    referer_path: &str,
) {
    if let Some(host) = proxy_host.filter(|h| !h.is_empty()) {
        if let Ok(origin) = HeaderValue::from_str(host) {
            headers.insert(header::ORIGIN, origin);
        }
        if let Ok(referer) = HeaderValue::from_str(&format!("{host}{referer_path}")) {
            headers.insert(header::REFERER, referer);
        }
    }
    headers.insert(header::ACCEPT_ENCODING, VALUE_GZIP.clone());
}

/// Extension trait for adding dynamic headers to responses.
pub trait ResponseHeadersExt {
    /// Append a header from strings.
    /// Returns false if either part is not a valid header name or value.
    fn append_header_value(&mut self, name: &str, value: &str) -> bool;
}

impl<B> ResponseHeadersExt for Response<B> {
    fn append_header_value(&mut self, name: &str, value: &str) -> bool {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers_mut().append(name, value);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;

    #[test]
    fn test_internal_headers() {
        assert!(is_internal_header("X-GDC-TRACE-ID"));
        assert!(is_internal_header("x-gdc-cancel-token"));
        assert!(is_internal_header("Date"));
        assert!(!is_internal_header("X-Request-Id"));
    }

    #[test]
    fn test_exclusion_sets_are_nested() {
        assert!(is_relay_excluded("Content-Length"));
        assert!(!is_relay_excluded("Connection"));
        assert!(is_snapshot_excluded("Connection"));
        assert!(is_snapshot_excluded("transfer-encoding"));
        assert!(is_snapshot_excluded("content-encoding"));
        assert!(!is_snapshot_excluded("Content-Type"));
    }

    #[test]
    fn test_transform_with_proxy_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("br"));
        transform_request_headers(&mut headers, Some("https://api.example.com"), "/app/");

        assert_eq!(headers[header::ORIGIN], "https://api.example.com");
        assert_eq!(headers[header::REFERER], "https://api.example.com/app/");
        assert_eq!(headers[header::ACCEPT_ENCODING], "gzip");
    }

    #[test]
    fn test_transform_without_proxy_host() {
        let mut headers = HeaderMap::new();
        transform_request_headers(&mut headers, None, "/");
        assert!(headers.get(header::ORIGIN).is_none());
        assert!(headers.get(header::REFERER).is_none());
        assert_eq!(headers[header::ACCEPT_ENCODING], "gzip");
    }

    #[test]
    fn test_append_header_value() {
        let mut response = Response::new(Full::new(Bytes::new()));
        assert!(response.append_header_value("Set-Cookie", "a=1"));
        assert!(response.append_header_value("Set-Cookie", "b=2"));
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert!(!response.append_header_value("Bad Name", "x"));
        assert!(!response.append_header_value("X-Ok", "bad\nvalue"));
    }
}
