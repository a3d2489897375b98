//! Request handling for the mock listener.
//!
//! `/__admin` requests go to the admin API. Everything else is replayed from
//! stubs, or forwarded upstream (and recorded in record mode).

use super::state::ServerState;
use crate::admin_api;
use crate::config::ServerMode;
use crate::matching::{render_mismatch, IncomingRequest};
use crate::metrics;
use crate::proxy::{
    is_internal_header, is_relay_excluded, transform_request_headers, ForwardedResponse,
    ResponseHeadersExt,
};
use crate::recording::RecordedExchange;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Request bodies longer than this are cut in verbose logs.
const VERBOSE_BODY_LIMIT: usize = 1000;

/// A non-admin request with its body read.
#[derive(Debug)]
pub struct MockRequest {
    pub method: Method,
    /// Path plus query exactly as received
    pub raw_uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Entry point for every connection's service.
pub async fn handle_request(
    state: Arc<ServerState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    if admin_api::is_admin_path(req.uri().path()) {
        return admin_api::route_request(req, state).await;
    }

    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    let raw_uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let request = MockRequest {
        method: parts.method,
        raw_uri,
        headers: parts.headers,
        body,
    };
    Ok(handle_mock(&state, request).await)
}

/// Serve a non-admin request according to the server mode.
pub async fn handle_mock(state: &ServerState, mut request: MockRequest) -> Response<Full<Bytes>> {
    let verbose = state.config.verbose;
    if verbose {
        log_verbose_request(&request);
    }

    transform_request_headers(
        &mut request.headers,
        state.config.upstream_base(),
        &state.config.referer_path,
    );

    let method = request.method.clone();
    let raw_uri = request.raw_uri.clone();
    let response = match state.mode() {
        ServerMode::Replay => replay(state, request),
        ServerMode::Record => forward(state, request, true).await,
        ServerMode::Proxy => forward(state, request, false).await,
    };

    if verbose {
        info!(
            "[verbose] << {} {} {} ({} bytes)",
            response.status().as_u16(),
            method,
            raw_uri,
            response_size(&response)
        );
    }
    response
}

fn replay(state: &ServerState, request: MockRequest) -> Response<Full<Bytes>> {
    let incoming = IncomingRequest::new(request.method.as_str(), request.raw_uri.as_str())
        .with_headers(request.headers)
        .with_body(request.body);
    let result = state.stubs.find_best_match(&incoming);

    let stub = match result.stub.as_ref() {
        Some(stub) if result.matched => stub,
        _ => {
            metrics::record_request(ServerMode::Replay.as_str(), "unmatched");
            warn!(
                "\n{}",
                render_mismatch(request.method.as_str(), &request.raw_uri, &result)
            );
            return json_error(StatusCode::NOT_FOUND, "No matching stub found");
        }
    };

    metrics::record_request(ServerMode::Replay.as_str(), "matched");
    debug!(
        "Matched {} {} -> {}",
        request.method,
        request.raw_uri,
        stub.display_name()
    );

    let definition = &stub.response;
    let status = StatusCode::from_u16(definition.status).unwrap_or(StatusCode::OK);
    let mut response = Response::new(Full::new(Bytes::from(definition.body_bytes())));
    *response.status_mut() = status;
    for (name, value) in &definition.headers {
        if is_internal_header(name) {
            continue;
        }
        for v in value.values() {
            if !response.append_header_value(name, v) {
                debug!("Skipping invalid stub header {}: {}", name, v);
            }
        }
    }
    response
}

async fn forward(state: &ServerState, request: MockRequest, record: bool) -> Response<Full<Bytes>> {
    let mode = state.mode().as_str();
    let Some(forwarder) = state.forwarder.as_ref() else {
        error!("No upstream configured for {} mode", mode);
        metrics::record_request(mode, "upstream_error");
        return json_error(StatusCode::BAD_GATEWAY, "proxy error: no upstream configured");
    };

    let upstream = match forwarder
        .forward(
            request.method.as_str(),
            &request.raw_uri,
            &request.headers,
            request.body.clone(),
        )
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Proxy error: {}", e);
            metrics::record_request(mode, "upstream_error");
            return json_error(StatusCode::BAD_GATEWAY, &format!("proxy error: {e}"));
        }
    };

    metrics::record_request(mode, "forwarded");
    let response = relay_response(&upstream);

    if record {
        state.recorder.record(RecordedExchange {
            method: request.method.as_str().to_string(),
            raw_uri: request.raw_uri,
            request_body: request.body,
            status: upstream.status,
            response_headers: upstream.headers,
            response_body: upstream.body,
        });
        metrics::record_exchange();
    }
    response
}

/// Client response for an upstream response, minus headers that no longer apply.
fn relay_response(upstream: &ForwardedResponse) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(upstream.body.clone()));
    *response.status_mut() =
        StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    for (name, value) in &upstream.headers {
        if !is_relay_excluded(name) {
            response.append_header_value(name, value);
        }
    }
    response
}

fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.append_header_value("Content-Type", "application/json");
    response
}

fn response_size(response: &Response<Full<Bytes>>) -> u64 {
    use hyper::body::Body;
    response.body().size_hint().exact().unwrap_or(0)
}

fn log_verbose_request(request: &MockRequest) {
    info!("[verbose] >> {} {}", request.method, request.raw_uri);
    for (name, value) in &request.headers {
        info!(
            "[verbose]    {}: {}",
            name,
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    if !request.body.is_empty() {
        info!("[verbose]    Body: {}", body_preview(&request.body));
    }
}

/// Lossy text of a body, cut at [`VERBOSE_BODY_LIMIT`] bytes.
fn body_preview(body: &[u8]) -> String {
    if body.len() <= VERBOSE_BODY_LIMIT {
        return String::from_utf8_lossy(body).into_owned();
    }
    format!(
        "{}... ({} bytes total)",
        String::from_utf8_lossy(&body[..VERBOSE_BODY_LIMIT]),
        body.len()
    )
}
