//! Shared state for one running server.

use crate::config::{Config, ServerMode};
use crate::mapping::StubRepository;
use crate::proxy::{ForwardError, Forwarder};
use crate::recording::ExchangeRecorder;

/// Everything a request handler needs, shared behind an `Arc`.
#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub stubs: StubRepository,
    pub recorder: ExchangeRecorder,
    /// Present in record and proxy mode
    pub forwarder: Option<Forwarder>,
}

impl ServerState {
    pub fn new(config: Config) -> Result<Self, ForwardError> {
        let forwarder = match config.upstream_base() {
            Some(base) if config.mode.needs_upstream() => {
                Some(Forwarder::new(base, config.upstream_timeout())?)
            }
            _ => None,
        };
        Ok(Self {
            config,
            stubs: StubRepository::new(),
            recorder: ExchangeRecorder::new(),
            forwarder,
        })
    }

    pub fn mode(&self) -> ServerMode {
        self.config.mode
    }

    /// Clear stubs, and recordings when recording.
    ///
    /// Returns the number of stubs and exchanges dropped.
    pub fn reset(&self) -> (usize, usize) {
        let stubs = self.stubs.clear();
        let exchanges = if self.mode() == ServerMode::Record {
            self.recorder.clear()
        } else {
            0
        };
        (stubs, exchanges)
    }
}
