//! Stub generation from recorded exchanges.

use super::content_type::is_json_content_type;
use super::snapshot::SnapshotOptions;
use super::types::RecordedExchange;
use crate::json::{normalize_arrays, sort_object_keys};
use crate::mapping::{
    BodyPattern, HeaderValue, QueryParamMatcher, RequestPattern, ResponseDefinition, StubMapping,
};
use crate::matching::{parse_query_pairs, split_uri};
use crate::proxy::is_snapshot_excluded;
use serde_json::Value;
use std::collections::BTreeMap;

/// Header name segments WireMock keeps fully upper-cased.
const UPPERCASE_SEGMENTS: &[&str] = &[
    "XSS", "HTTP", "ID", "DNS", "CSP", "URI", "URL", "SSL", "TLS", "IP",
];

/// Generate a WireMock stub from a recorded exchange.
///
/// Requests with a query string are matched by `urlPath` plus one
/// `hasExactly` matcher per parameter; requests without one by exact `url`.
/// A JSON request body becomes an exact `equalToJson` pattern.
pub fn exchange_to_stub(exchange: &RecordedExchange, options: &SnapshotOptions) -> StubMapping {
    let (path, query) = split_uri(&exchange.raw_uri);

    let mut request = RequestPattern {
        method: exchange.method.clone(),
        ..Default::default()
    };

    match query.filter(|q| !q.is_empty()) {
        Some(query) => {
            request.url_path = Some(path.to_string());
            request.query_parameters = query_matchers(query);
        }
        None => request.url = Some(path.to_string()),
    }

    if let Some(pattern) = body_pattern(&exchange.request_body, options) {
        request.body_patterns = vec![pattern];
    }

    StubMapping {
        name: Some(generate_mapping_name(&exchange.raw_uri)),
        request,
        response: response_definition(exchange, options),
        ..Default::default()
    }
}

/// Group decoded query pairs into `hasExactly` matchers, values in arrival order.
fn query_matchers(query: &str) -> BTreeMap<String, QueryParamMatcher> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in parse_query_pairs(query) {
        values.entry(key).or_default().push(value);
    }
    values
        .into_iter()
        .map(|(key, values)| (key, QueryParamMatcher::has_exactly(values)))
        .collect()
}

fn body_pattern(body: &[u8], options: &SnapshotOptions) -> Option<BodyPattern> {
    if body.is_empty() {
        return None;
    }
    let parsed: Value = serde_json::from_slice(body).ok()?;
    let normalized = normalize_json_value(parsed, options);
    let text = serde_json::to_string(&normalized).ok()?;
    Some(BodyPattern::equal_to_json_text(text))
}

fn response_definition(exchange: &RecordedExchange, options: &SnapshotOptions) -> ResponseDefinition {
    let headers = exchange
        .grouped_response_headers()
        .into_iter()
        .filter(|(name, _)| !is_snapshot_excluded(name))
        .map(|(name, values)| (normalize_header_name(&name), HeaderValue::from_values(values)))
        .collect();

    let mut response = ResponseDefinition {
        status: exchange.status,
        headers,
        ..Default::default()
    };

    let json_body = is_json_content_type(&exchange.response_headers, &options.json_content_types)
        .then(|| serde_json::from_slice::<Value>(&exchange.response_body).ok())
        .flatten();

    match json_body {
        Some(value) => response.json_body = Some(normalize_json_value(value, options)),
        None => {
            response.body = Some(String::from_utf8_lossy(&exchange.response_body).into_owned())
        }
    }
    response
}

/// Apply the configured array sorting and key ordering to a parsed body.
pub fn normalize_json_value(value: Value, options: &SnapshotOptions) -> Value {
    let value = if options.sort_array_members {
        normalize_arrays(value)
    } else {
        value
    };
    if options.preserve_key_order {
        value
    } else {
        sort_object_keys(value)
    }
}

/// Title-Case a header name, keeping well-known abbreviations upper-cased.
///
/// `x-xss-protection` becomes `X-XSS-Protection`.
pub fn normalize_header_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let upper = segment.to_ascii_uppercase();
            if segment.is_empty() || UPPERCASE_SEGMENTS.contains(&upper.as_str()) {
                return upper;
            }
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive a stub name from the path of a raw URI.
///
/// `/api/v1/items%3Aall?x=1` becomes `api_v1_itemsall`.
pub fn generate_mapping_name(raw_uri: &str) -> String {
    let (path, _) = split_uri(raw_uri);
    path.strip_prefix('/')
        .unwrap_or(path)
        .replace('/', "_")
        .replace("%3A", "")
        .replace("%3a", "")
        .to_lowercase()
}
