//! Route dispatch logic for the Admin API.

use crate::admin_api::handlers::{mappings, recordings, system};
use crate::admin_api::types::{collect_body, error_response, not_found};
use crate::server::ServerState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ADMIN_PREFIX: &str = "/__admin";

/// True for `/__admin` and anything below it.
pub fn is_admin_path(path: &str) -> bool {
    match path.strip_prefix(ADMIN_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Parsed route below `/__admin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminRoute {
    /// /__admin
    Root,
    /// /__admin/health
    Health,
    /// /__admin/metrics
    Metrics,
    /// /__admin/reset
    Reset,
    /// /__admin/settings
    Settings,
    /// /__admin/scenarios/reset
    ScenariosReset,
    /// /__admin/mappings
    Mappings,
    /// /__admin/mappings/import
    MappingsImport,
    /// /__admin/mappings/reset
    MappingsReset,
    /// /__admin/requests
    Requests,
    /// /__admin/recordings/snapshot
    RecordingsSnapshot,
}

impl AdminRoute {
    /// Parse route from path segments after `/__admin`
    fn parse(segments: &[&str]) -> Option<Self> {
        match segments {
            [] => Some(AdminRoute::Root),
            ["health"] => Some(AdminRoute::Health),
            ["metrics"] => Some(AdminRoute::Metrics),
            ["reset"] => Some(AdminRoute::Reset),
            ["settings"] => Some(AdminRoute::Settings),
            ["scenarios", "reset"] => Some(AdminRoute::ScenariosReset),
            ["mappings"] => Some(AdminRoute::Mappings),
            ["mappings", "import"] => Some(AdminRoute::MappingsImport),
            ["mappings", "reset"] => Some(AdminRoute::MappingsReset),
            ["requests"] => Some(AdminRoute::Requests),
            ["recordings", "snapshot"] => Some(AdminRoute::RecordingsSnapshot),
            _ => None,
        }
    }
}

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Admin API: {} {}", method, path);

    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => return Ok(error_response(StatusCode::BAD_REQUEST, &e)),
    };
    Ok(route_admin(&method, &path, body, &state))
}

/// Dispatch an admin request whose body has already been read.
pub fn route_admin(
    method: &Method,
    path: &str,
    body: Bytes,
    state: &ServerState,
) -> Response<Full<Bytes>> {
    let rest = path.strip_prefix(ADMIN_PREFIX).unwrap_or(path);
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    let route = match AdminRoute::parse(&segments) {
        Some(r) => r,
        None => return unknown_endpoint(method, path),
    };

    match (method, route) {
        (&Method::GET, AdminRoute::Root) | (_, AdminRoute::Health) => system::handle_health(),
        (&Method::GET, AdminRoute::Metrics) => system::handle_metrics(),
        (&Method::POST, AdminRoute::Settings) => system::handle_settings(),
        (&Method::POST, AdminRoute::ScenariosReset) => system::handle_scenarios_reset(),

        (&Method::POST, AdminRoute::Reset) | (&Method::POST, AdminRoute::MappingsReset) => {
            mappings::handle_reset(state)
        }
        (&Method::GET, AdminRoute::Mappings) => mappings::handle_list(state),
        (&Method::POST, AdminRoute::Mappings) => mappings::handle_add(&body, state),
        (&Method::DELETE, AdminRoute::Mappings) => mappings::handle_clear(state),
        (&Method::POST, AdminRoute::MappingsImport) => mappings::handle_import(&body, state),

        (&Method::DELETE, AdminRoute::Requests) => recordings::handle_clear_requests(state),
        (&Method::POST, AdminRoute::RecordingsSnapshot) => {
            recordings::handle_snapshot(&body, state)
        }

        _ => unknown_endpoint(method, path),
    }
}

fn unknown_endpoint(method: &Method, path: &str) -> Response<Full<Bytes>> {
    warn!("Unknown admin endpoint: {} {}", method, path);
    not_found()
}
