//! Recording handlers: snapshot export and clearing captured requests.

use crate::admin_api::types::*;
use crate::config::ServerMode;
use crate::mapping::MappingsDocument;
use crate::metrics;
use crate::recording::{convert_exchanges, SnapshotRequest, UrlFilter};
use crate::server::ServerState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::{debug, info, warn};

/// POST /__admin/recordings/snapshot
///
/// Drains the exchanges accepted by the URL filter and returns them as a
/// mappings document. Outside record mode nothing is captured, so the
/// document is always empty.
pub fn handle_snapshot(body: &[u8], state: &ServerState) -> Response<Full<Bytes>> {
    if state.mode() != ServerMode::Record {
        return json_response(StatusCode::OK, &MappingsDocument::default());
    }

    let request = parse_snapshot_request(body);
    if request.persist {
        debug!("Snapshot 'persist' requested; mappings are only returned");
    }

    let filter = request
        .filters
        .url_pattern
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(UrlFilter::compile);
    let exchanges = state.recorder.drain_matching(filter.as_ref());

    let options = state
        .config
        .recording
        .snapshot_options(request.repeats_as_scenarios);
    let mappings = convert_exchanges(&exchanges, &options);

    let scenario = mappings
        .iter()
        .filter(|m| m.scenario_name.is_some())
        .count();
    metrics::record_snapshot(mappings.len() - scenario, scenario);
    info!(
        "Snapshot: {} exchanges -> {} mappings ({} remaining)",
        exchanges.len(),
        mappings.len(),
        state.recorder.len()
    );

    json_response(StatusCode::OK, &MappingsDocument { mappings })
}

/// An unreadable body falls back to the default request.
fn parse_snapshot_request(body: &[u8]) -> SnapshotRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return SnapshotRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Ignoring malformed snapshot request: {}", e);
        SnapshotRequest::default()
    })
}

/// DELETE /__admin/requests
pub fn handle_clear_requests(state: &ServerState) -> Response<Full<Bytes>> {
    let removed = state.recorder.clear();
    info!("Cleared {} recorded exchanges", removed);
    empty_response(StatusCode::OK)
}
