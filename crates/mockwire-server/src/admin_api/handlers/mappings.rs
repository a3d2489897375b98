//! Stub mapping handlers.

use crate::admin_api::types::*;
use crate::mapping::{MappingsDocument, StubMapping};
use crate::server::ServerState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;

/// GET /__admin/mappings
pub fn handle_list(state: &ServerState) -> Response<Full<Bytes>> {
    let document = MappingsDocument {
        mappings: state.stubs.list(),
    };
    json_response(StatusCode::OK, &document)
}

/// POST /__admin/mappings - add a single mapping
pub fn handle_add(body: &[u8], state: &ServerState) -> Response<Full<Bytes>> {
    let mapping: StubMapping = match serde_json::from_slice(body) {
        Ok(m) => m,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid mapping: {e}"))
        }
    };

    info!(
        "Added mapping: {} {}",
        mapping.request.method,
        mapping.request.url_description()
    );
    state.stubs.add(mapping);
    empty_response(StatusCode::CREATED)
}

/// DELETE /__admin/mappings
pub fn handle_clear(state: &ServerState) -> Response<Full<Bytes>> {
    let removed = state.stubs.clear();
    info!("Cleared {} mappings", removed);
    empty_response(StatusCode::OK)
}

/// POST /__admin/mappings/import - append every mapping of a document
pub fn handle_import(body: &[u8], state: &ServerState) -> Response<Full<Bytes>> {
    let document: MappingsDocument = match serde_json::from_slice(body) {
        Ok(d) => d,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid mappings document: {e}"),
            )
        }
    };

    let count = state.stubs.import(document.mappings);
    info!("Imported {} mappings", count);
    empty_response(StatusCode::OK)
}

/// POST /__admin/reset and POST /__admin/mappings/reset
pub fn handle_reset(state: &ServerState) -> Response<Full<Bytes>> {
    let (stubs, exchanges) = state.reset();
    info!(
        "Reset: removed {} mappings and {} recorded exchanges",
        stubs, exchanges
    );
    empty_response(StatusCode::OK)
}
