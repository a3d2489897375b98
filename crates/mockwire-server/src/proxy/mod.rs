//! Upstream plumbing for record and proxy modes.
//!
//! # Module Structure
//!
//! - `forwarding` - Request forwarding over a shared HTTP client
//! - `headers` - Request header rewrite and response header filtering

mod forwarding;
mod headers;

pub use forwarding::{ForwardError, ForwardedResponse, Forwarder};
pub use headers::{
    is_internal_header, is_relay_excluded, is_snapshot_excluded, transform_request_headers,
    ResponseHeadersExt,
};
