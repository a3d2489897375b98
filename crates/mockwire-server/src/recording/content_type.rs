//! Classify response bodies as structured JSON by their Content-Type.

/// Media type that is always treated as JSON.
pub const DEFAULT_JSON_CONTENT_TYPE: &str = "application/json";

/// True when any `Content-Type` value names a JSON media type.
///
/// Parameters after `;` are ignored and comparison is case-insensitive.
/// `application/json` is always accepted in addition to `configured`.
pub fn is_json_content_type(headers: &[(String, String)], configured: &[String]) -> bool {
    headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.split(';').next().unwrap_or("").trim())
        .any(|media_type| {
            media_type.eq_ignore_ascii_case(DEFAULT_JSON_CONTENT_TYPE)
                || configured
                    .iter()
                    .any(|json_type| media_type.eq_ignore_ascii_case(json_type.trim()))
        })
}

/// Parse a comma separated media type list, dropping blanks and duplicates of
/// the default.
pub fn parse_content_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(DEFAULT_JSON_CONTENT_TYPE))
        .map(str::to_string)
        .collect()
}
