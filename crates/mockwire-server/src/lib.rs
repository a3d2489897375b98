//! Mockwire: a WireMock-compatible mock, record and proxy HTTP server.
//!
//! - `replay` serves stub mappings loaded from disk or the admin API
//! - `record` forwards to an upstream and captures every exchange
//! - `proxy` forwards without capturing
//!
//! Captured exchanges are exported through `POST /__admin/recordings/snapshot`
//! as deterministic, diff-stable stub mappings.

pub mod admin_api;
pub mod config;
pub mod json;
pub mod mapping;
pub mod matching;
pub mod metrics;
pub mod proxy;
pub mod recording;
pub mod server;
