//! Configuration types for the mockwire server.

mod cli;
mod mode;
mod recording;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cli::Cli;
pub use mode::ServerMode;
pub use recording::RecordingConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// replay (default), record or proxy
    #[serde(default)]
    pub mode: ServerMode,

    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    // ===== Upstream (record and proxy modes) =====
    /// Upstream base URL without trailing path, e.g. `https://api.example.com`.
    /// Also drives the Origin/Referer rewrite in every mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,

    /// Appended to the upstream for the Referer header
    #[serde(default = "default_referer_path")]
    pub referer_path: String,

    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    // ===== Stubs =====
    /// Directory of mapping files imported at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings_dir: Option<PathBuf>,

    /// Log request and response details
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub recording: RecordingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_referer_path() -> String {
    "/".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ServerMode::default(),
            host: default_host(),
            port: default_port(),
            proxy_host: None,
            referer_path: default_referer_path(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            mappings_dir: None,
            verbose: false,
            recording: RecordingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without validating, so overrides can still apply.
    pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.mode.needs_upstream() {
            let Some(host) = self.proxy_host.as_deref() else {
                anyhow::bail!(
                    "An upstream is required in {} mode. Set 'proxyHost' or PROXY_HOST",
                    self.mode
                );
            };
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                anyhow::bail!(
                    "Upstream '{}' must start with http:// or https://",
                    host
                );
            }
        }

        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("'upstreamTimeoutSecs' must be greater than zero");
        }

        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Upstream base URL without a trailing slash
    pub fn upstream_base(&self) -> Option<&str> {
        self.proxy_host
            .as_deref()
            .map(|host| host.trim_end_matches('/'))
            .filter(|host| !host.is_empty())
    }
}
