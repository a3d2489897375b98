//! WireMock-compatible admin API served under the `/__admin` prefix.
//!
//! Mapping management, recording snapshots, health and metrics share the
//! mock listener; the server hands every `/__admin` request to
//! [`route_request`].

mod handlers;
mod router;
mod types;

pub use router::{is_admin_path, route_admin, route_request, ADMIN_PREFIX};
