//! Request view consumed by the match engine.

use bytes::Bytes;
use hyper::HeaderMap;

/// The parts of an inbound request that stubs are matched against.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub method: String,
    /// Path without the query string
    pub path: String,
    /// Path and query string exactly as received
    pub full_uri: String,
    /// Decoded query parameters in arrival order, repeated names kept
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    /// Build from a method and a raw request URI (path plus optional query).
    pub fn new(method: impl Into<String>, raw_uri: impl Into<String>) -> Self {
        let full_uri = raw_uri.into();
        let (path, query) = split_uri(&full_uri);
        Self {
            method: method.into(),
            path: path.to_string(),
            query: query.map(parse_query_pairs).unwrap_or_default(),
            full_uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// All values of a query parameter, in arrival order.
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// First value of a header (case-insensitive name); empty when absent.
    pub fn header_value(&self, name: &str) -> String {
        self.headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default()
    }
}

/// Split a raw URI on the first `?`.
pub fn split_uri(raw_uri: &str) -> (&str, Option<&str>) {
    match raw_uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw_uri, None),
    }
}

/// Parse a query string into decoded `(name, value)` pairs.
///
/// Every `&`-separated segment yields a pair, empty ones included, so a
/// recorded `?&` still pins the query. A segment without `=` has an empty value.
pub fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            (decode_query_component(key), decode_query_component(value))
        })
        .collect()
}

/// Percent-decode a query component with `+` as space.
/// Falls back to the raw text when the result is not valid UTF-8.
pub fn decode_query_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
