//! System handlers: health, metrics, settings, scenarios.

use crate::admin_api::types::*;
use crate::metrics;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET /__admin and GET /__admin/health
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &StatusResponse { status: "ok" })
}

/// GET /__admin/metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        metrics::collect_metrics(),
    )
}

/// POST /__admin/settings - accepted and ignored
pub fn handle_settings() -> Response<Full<Bytes>> {
    empty_response(StatusCode::OK)
}

/// POST /__admin/scenarios/reset
///
/// Scenario state is not tracked during replay, so there is nothing to reset.
pub fn handle_scenarios_reset() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({}))
}
