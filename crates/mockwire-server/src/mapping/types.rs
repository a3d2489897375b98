//! Type definitions for WireMock-compatible stub mappings.
//!
//! Field names and ordering follow WireMock's mapping file format so that
//! exported snapshots can be fed back into WireMock (or this server) as-is.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Mapping Document
// ============================================================================

/// Root structure of a WireMock mappings file or snapshot response.
///
/// Only a JSON object is accepted; `[]` or a bare stub list is rejected rather
/// than read as an empty document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingsDocument {
    /// Always serialized, as `[]` when empty
    pub mappings: Vec<StubMapping>,
}

impl MappingsDocument {
    pub fn new(mappings: Vec<StubMapping>) -> Self {
        Self { mappings }
    }
}

impl<'de> Deserialize<'de> for MappingsDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = MappingsDocument;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object with a \"mappings\" array")
            }

            fn visit_map<A>(self, mut map: A) -> Result<MappingsDocument, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mappings = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "mappings" {
                        if mappings.is_some() {
                            return Err(de::Error::duplicate_field("mappings"));
                        }
                        mappings = Some(map.next_value()?);
                    } else {
                        map.next_value::<de::IgnoredAny>()?;
                    }
                }
                Ok(MappingsDocument {
                    mappings: mappings.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

// ============================================================================
// Stub Mapping
// ============================================================================

/// A single request-matching rule paired with its canned response.
/// Field ordering matches WireMock output: id, uuid, name, scenario fields, request, response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Human label, also the primary sort key of snapshot output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scenario_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_scenario_state: Option<String>,
    /// A missing block yields a pattern with no URL, which never matches
    #[serde(default)]
    pub request: RequestPattern,
    #[serde(default)]
    pub response: ResponseDefinition,
}

impl StubMapping {
    /// Name used in logs and reports; empty string when the stub has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Request Pattern
// ============================================================================

/// The URL matching mode of a request pattern.
///
/// Only one mode is consulted per evaluation even when several fields are
/// populated, in precedence order `url`, `urlPath`, `urlPattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMatch<'a> {
    /// `url`: path and query string, verbatim
    Exact(&'a str),
    /// `urlPath`: path only
    PathExact(&'a str),
    /// `urlPattern`: regular expression searched in path and query string
    Pattern(&'a str),
    /// No URL constraint configured, never matches
    Unspecified,
}

/// Request matching criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    /// HTTP method or the wildcard `ANY`
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query_parameters: BTreeMap<String, QueryParamMatcher>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_patterns: Vec<BodyPattern>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderMatcher>,
}

pub(crate) fn default_method() -> String {
    ANY_METHOD.to_string()
}

/// Method literal that matches every request method
pub const ANY_METHOD: &str = "ANY";

impl Default for RequestPattern {
    fn default() -> Self {
        Self {
            url: None,
            url_path: None,
            url_pattern: None,
            method: default_method(),
            query_parameters: BTreeMap::new(),
            body_patterns: Vec::new(),
            headers: BTreeMap::new(),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl RequestPattern {
    /// Resolve the URL matching mode. Empty strings count as unset.
    pub fn url_match(&self) -> UrlMatch<'_> {
        if let Some(url) = non_empty(&self.url) {
            UrlMatch::Exact(url)
        } else if let Some(path) = non_empty(&self.url_path) {
            UrlMatch::PathExact(path)
        } else if let Some(pattern) = non_empty(&self.url_pattern) {
            UrlMatch::Pattern(pattern)
        } else {
            UrlMatch::Unspecified
        }
    }

    /// The URL expression shown in logs: url, urlPath or urlPattern.
    pub fn url_description(&self) -> &str {
        match self.url_match() {
            UrlMatch::Exact(s) | UrlMatch::PathExact(s) | UrlMatch::Pattern(s) => s,
            UrlMatch::Unspecified => "",
        }
    }
}

/// Query parameter matcher: `equalTo` or `hasExactly`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParamMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_exactly: Vec<EqualToMatcher>,
}

impl QueryParamMatcher {
    pub fn equal_to(value: impl Into<String>) -> Self {
        Self {
            equal_to: Some(value.into()),
            has_exactly: Vec::new(),
        }
    }

    pub fn has_exactly<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            equal_to: None,
            has_exactly: values
                .into_iter()
                .map(|v| EqualToMatcher {
                    equal_to: v.into(),
                })
                .collect(),
        }
    }

    /// Values the parameter must carry: one for `equalTo`, the literal list for `hasExactly`.
    pub fn expected_values(&self) -> Vec<&str> {
        match self.equal_to.as_deref() {
            Some(value) => vec![value],
            None => self
                .has_exactly
                .iter()
                .map(|m| m.equal_to.as_str())
                .collect(),
        }
    }
}

/// `{"equalTo": "..."}` element of a `hasExactly` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqualToMatcher {
    pub equal_to: String,
}

/// Header matcher: exact `equalTo` or substring `contains`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

impl HeaderMatcher {
    pub fn equal_to(value: impl Into<String>) -> Self {
        Self {
            equal_to: Some(value.into()),
            contains: None,
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            equal_to: None,
            contains: Some(value.into()),
        }
    }

    /// Short form for reports, e.g. `equalTo application/json`
    pub fn describe(&self) -> String {
        match (&self.equal_to, &self.contains) {
            (Some(v), _) => format!("equalTo {v}"),
            (None, Some(v)) => format!("contains {v}"),
            (None, None) => "any".to_string(),
        }
    }
}

/// Request body constraint.
///
/// `equalToJson` is either a JSON value or, in the classic recorded form, a
/// string holding JSON text. The ignore flags are carried through but only
/// exact equality is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_array_order: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_extra_elements: Option<bool>,
}

impl BodyPattern {
    /// Exact JSON equality against `json_text`, stored double-encoded with both flags off.
    pub fn equal_to_json_text(json_text: String) -> Self {
        Self {
            equal_to_json: Some(Value::String(json_text)),
            ignore_array_order: Some(false),
            ignore_extra_elements: Some(false),
        }
    }
}

// ============================================================================
// Response Definition
// ============================================================================

/// Response header value: a single string or a list for multi-valued headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Build from recorded values; one value stays a plain string.
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            HeaderValue::Single(values.remove(0))
        } else {
            HeaderValue::Multiple(values)
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Single(value) => std::slice::from_ref(value),
            HeaderValue::Multiple(values) => values,
        }
    }
}

/// Stub response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(
        default = "default_status",
        deserialize_with = "deserialize_status"
    )]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Structured body; takes precedence over `body` when serving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_body: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderValue>,
    /// Accepted for compatibility with WireMock files; not acted upon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
}

impl Default for ResponseDefinition {
    fn default() -> Self {
        Self {
            status: default_status(),
            body: None,
            json_body: None,
            headers: BTreeMap::new(),
            proxy_base_url: None,
        }
    }
}

pub(crate) fn default_status() -> u16 {
    200
}

/// Deserialize status from either a number or a numeric string
pub(crate) fn deserialize_status<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| D::Error::custom("invalid status number")),
        Value::String(s) => s
            .parse::<u16>()
            .map_err(|_| D::Error::custom(format!("invalid status string: {s}"))),
        _ => Err(D::Error::custom("status must be a number or string")),
    }
}

impl ResponseDefinition {
    /// Bytes to send as the response body. `jsonBody` wins over `body`.
    pub fn body_bytes(&self) -> Vec<u8> {
        match (&self.json_body, &self.body) {
            (Some(json), _) => serde_json::to_vec(json).unwrap_or_default(),
            (None, Some(body)) => body.as_bytes().to_vec(),
            (None, None) => Vec::new(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while loading mapping files
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
