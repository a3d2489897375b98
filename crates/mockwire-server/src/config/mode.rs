//! Server operating modes.

use serde::{Deserialize, Serialize};

/// How non-admin requests are served.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Answer from stub mappings, 404 with a mismatch report otherwise
    #[default]
    Replay,
    /// Forward to the upstream and capture every exchange for snapshots
    Record,
    /// Forward to the upstream without capturing anything
    Proxy,
}

impl ServerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerMode::Replay => "replay",
            ServerMode::Record => "record",
            ServerMode::Proxy => "proxy",
        }
    }

    /// Record and proxy modes talk to an upstream
    pub fn needs_upstream(&self) -> bool {
        matches!(self, ServerMode::Record | ServerMode::Proxy)
    }
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
