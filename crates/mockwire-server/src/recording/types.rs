//! Captured request/response exchanges.

use bytes::Bytes;

/// One proxied request and the upstream response it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExchange {
    pub method: String,
    /// Path plus percent-encoded query string, exactly as received
    pub raw_uri: String,
    pub request_body: Bytes,
    pub status: u16,
    /// Response headers in arrival order; repeated names appear repeatedly
    pub response_headers: Vec<(String, String)>,
    /// Decompressed response body
    pub response_body: Bytes,
}

impl RecordedExchange {
    /// Response headers grouped by case-insensitive name, first-seen order.
    /// The name keeps the casing of its first occurrence.
    pub fn grouped_response_headers(&self) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in &self.response_headers {
            match grouped
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            {
                Some((_, values)) => values.push(value.clone()),
                None => grouped.push((name.clone(), vec![value.clone()])),
            }
        }
        grouped
    }
}
