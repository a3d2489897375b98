//! Per-criterion evaluation of a stub against a request.

use super::request::IncomingRequest;
use super::result::{DiffCriterion, DiffKind, Evaluation, MatchDiff};
use crate::json::canonical_string;
use crate::mapping::{
    BodyPattern, HeaderMatcher, QueryParamMatcher, StubMapping, UrlMatch, ANY_METHOD,
};
use regex::Regex;
use serde_json::Value;

/// Evaluate every criterion of `stub`. Failures never short-circuit so the
/// result can be used for diagnostics.
pub fn evaluate_stub(stub: &StubMapping, request: &IncomingRequest) -> Evaluation {
    let pattern = &stub.request;
    let mut evaluation = Evaluation {
        method: method_matches(&pattern.method, &request.method),
        url: url_matches(pattern.url_match(), request),
        query: true,
        body: body_matches(&pattern.body_patterns, &request.body),
        headers: true,
        diffs: Vec::new(),
    };

    for (name, matcher) in &pattern.query_parameters {
        if let Some(diff) = check_query_param(name, matcher, request) {
            evaluation.query = false;
            evaluation.diffs.push(diff);
        }
    }

    for (name, matcher) in &pattern.headers {
        if let Some(diff) = check_header(name, matcher, request) {
            evaluation.headers = false;
            evaluation.diffs.push(diff);
        }
    }

    evaluation
}

fn method_matches(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual) || expected.eq_ignore_ascii_case(ANY_METHOD)
}

fn url_matches(url_match: UrlMatch<'_>, request: &IncomingRequest) -> bool {
    match url_match {
        UrlMatch::Exact(url) => url == request.full_uri,
        UrlMatch::PathExact(path) => path == request.path,
        UrlMatch::Pattern(pattern) => Regex::new(pattern)
            .map(|re| re.is_match(&request.full_uri))
            .unwrap_or(false),
        UrlMatch::Unspecified => false,
    }
}

fn check_query_param(
    name: &str,
    matcher: &QueryParamMatcher,
    request: &IncomingRequest,
) -> Option<MatchDiff> {
    let expected = matcher.expected_values();
    let actual = request.query_values(name);

    if same_values(&expected, &actual) {
        return None;
    }

    let kind = if actual.is_empty() {
        DiffKind::NotPresent
    } else {
        DiffKind::Mismatch
    };
    Some(MatchDiff {
        criterion: DiffCriterion::Query,
        kind,
        name: name.to_string(),
        expected: expected.iter().map(|v| v.to_string()).collect(),
        actual: actual.iter().map(|v| v.to_string()).collect(),
    })
}

/// Order-insensitive multiset equality
fn same_values(expected: &[&str], actual: &[&str]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut expected = expected.to_vec();
    let mut actual = actual.to_vec();
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

fn check_header(
    name: &str,
    matcher: &HeaderMatcher,
    request: &IncomingRequest,
) -> Option<MatchDiff> {
    let actual = request.header_value(name);
    if header_matches(matcher, &actual) {
        return None;
    }

    let kind = if actual.is_empty() {
        DiffKind::NotPresent
    } else {
        DiffKind::Mismatch
    };
    Some(MatchDiff {
        criterion: DiffCriterion::Header,
        kind,
        name: name.to_string(),
        expected: vec![matcher.describe()],
        actual: if actual.is_empty() {
            Vec::new()
        } else {
            vec![actual]
        },
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn header_matches(matcher: &HeaderMatcher, actual: &str) -> bool {
    if let Some(expected) = non_empty(&matcher.equal_to) {
        return expected == actual;
    }
    if let Some(needle) = non_empty(&matcher.contains) {
        return actual.contains(needle);
    }
    true
}

fn body_matches(patterns: &[BodyPattern], body: &[u8]) -> bool {
    patterns.iter().all(|pattern| match &pattern.equal_to_json {
        Some(expected) => json_equal(expected, body),
        None => true,
    })
}

/// Compare an `equalToJson` value with a raw request body.
///
/// A string `expected` is treated as JSON text and parsed first. Both sides
/// are compared by canonical serialization, so key order and whitespace do
/// not matter. Any parse failure is a non-match.
pub fn json_equal(expected: &Value, actual: &[u8]) -> bool {
    let expected = match expected {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        },
        other => other.clone(),
    };
    let actual: Value = match serde_json::from_slice(actual) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    canonical_string(&expected) == canonical_string(&actual)
}
