//! The mock HTTP server: shared state, connection loop and request handling.

mod handler;
mod listener;
mod state;

pub use handler::{handle_mock, handle_request, MockRequest};
pub use listener::MockServer;
pub use state::ServerState;
