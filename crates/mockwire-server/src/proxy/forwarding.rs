//! Request forwarding to the upstream server.
//!
//! Gzip responses are decompressed by the client, which also drops the
//! `Content-Encoding` and `Content-Length` headers that no longer apply.

use crate::metrics;
use bytes::Bytes;
use hyper::HeaderMap;
use reqwest::redirect::Policy;
use std::time::{Duration, Instant};
use tracing::debug;

/// Errors from talking to the upstream
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid method: {0}")]
    InvalidMethod(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upstream request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read upstream response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Upstream response with a fully buffered, decompressed body
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    /// Headers in arrival order, values decoded lossily
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Forwards requests to a single upstream base URL.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: String,
}

impl Forwarder {
    /// `upstream` is a base URL such as `https://api.example.com`; the raw
    /// request URI is appended verbatim.
    pub fn new(upstream: &str, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .gzip(true)
            .build()
            .map_err(ForwardError::Client)?;
        Ok(Self {
            client,
            upstream: upstream.trim_end_matches('/').to_string(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Send a request upstream and buffer the response.
    ///
    /// All request headers except `Host` are copied.
    pub async fn forward(
        &self,
        method: &str,
        raw_uri: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<ForwardedResponse, ForwardError> {
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| ForwardError::InvalidMethod(method.to_string()))?;
        let url = format!("{}{}", self.upstream, raw_uri);
        debug!("Forwarding {} {}", method, url);

        let mut upstream_headers = headers.clone();
        upstream_headers.remove(hyper::header::HOST);

        let started = Instant::now();
        let response = self
            .client
            .request(method.clone(), &url)
            .headers(upstream_headers)
            .body(body)
            .send()
            .await
            .map_err(|source| ForwardError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|source| ForwardError::Body { url, source })?;

        metrics::record_upstream_duration(
            method.as_str(),
            status,
            started.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let forwarder = Forwarder::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(forwarder.upstream(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_invalid_method_rejected() {
        let forwarder = Forwarder::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let result = forwarder
            .forward("BAD METHOD", "/", &HeaderMap::new(), Bytes::new())
            .await;
        assert!(matches!(result, Err(ForwardError::InvalidMethod(_))));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_request_error() {
        let forwarder = Forwarder::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = forwarder
            .forward("GET", "/x", &HeaderMap::new(), Bytes::new())
            .await;
        assert!(matches!(result, Err(ForwardError::Request { .. })));
    }
}
