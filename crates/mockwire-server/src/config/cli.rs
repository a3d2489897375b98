//! Command line arguments. Every option can also come from the environment.

use super::{Config, ServerMode};
use crate::recording::parse_content_type_list;
use clap::Parser;
use std::path::PathBuf;

/// Mockwire - WireMock-compatible mock, record and proxy server
#[derive(Parser, Debug, Default)]
#[command(name = "mockwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operating mode
    #[arg(value_enum)]
    pub mode: Option<ServerMode>,

    /// YAML configuration file; command line and environment values override it
    #[arg(short, long, env = "MOCKWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Upstream base URL, e.g. https://api.example.com (record and proxy modes)
    #[arg(long, env = "PROXY_HOST")]
    pub proxy_host: Option<String>,

    /// Path appended to the upstream for the Referer header
    #[arg(long, env = "REFERER_PATH")]
    pub referer_path: Option<String>,

    /// Log request and response details
    #[arg(
        short,
        long,
        env = "VERBOSE",
        action = clap::ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1",
        default_value = ""
    )]
    pub verbose: bool,

    /// Directory of *.json mapping files loaded at startup
    #[arg(long, env = "MAPPINGS_DIR")]
    pub mappings_dir: Option<PathBuf>,

    /// Comma separated media types recorded as jsonBody besides application/json
    #[arg(long, env = "JSON_CONTENT_TYPES")]
    pub json_content_types: Option<String>,

    /// Keep upstream JSON key order in recorded stubs
    #[arg(
        long,
        env = "PRESERVE_JSON_KEY_ORDER",
        action = clap::ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1",
        default_value = ""
    )]
    pub preserve_json_key_order: bool,

    /// Sort JSON array members in recorded stubs
    #[arg(
        long,
        env = "SORT_ARRAY_MEMBERS",
        action = clap::ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1",
        default_value = ""
    )]
    pub sort_array_members: bool,
}

/// Any non-empty value switches a flag on.
fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(!value.is_empty())
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then overrides.
    pub fn into_config(self) -> Result<Config, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => Config::read_file(path)?,
            None => Config::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(proxy_host) = self.proxy_host.filter(|h| !h.is_empty()) {
            config.proxy_host = Some(proxy_host);
        }
        if let Some(referer_path) = self.referer_path.filter(|p| !p.is_empty()) {
            config.referer_path = referer_path;
        }
        if let Some(dir) = self.mappings_dir {
            config.mappings_dir = Some(dir);
        }
        if let Some(types) = self.json_content_types {
            config.recording.json_content_types = parse_content_type_list(&types);
        }
        config.verbose |= self.verbose;
        config.recording.preserve_key_order |= self.preserve_json_key_order;
        config.recording.sort_array_members |= self.sort_array_members;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_and_flags() {
        let cli = Cli::try_parse_from([
            "mockwire",
            "record",
            "--port",
            "9090",
            "--proxy-host",
            "https://api.example.com",
            "--verbose",
            "--json-content-types",
            "application/vnd.api+json, text/x-json",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(ServerMode::Record));
        assert!(cli.verbose);
        assert!(!cli.sort_array_members);

        let config = cli.into_config().unwrap();
        assert_eq!(config.mode, ServerMode::Record);
        assert_eq!(config.port, 9090);
        assert_eq!(config.proxy_host.as_deref(), Some("https://api.example.com"));
        assert_eq!(
            config.recording.json_content_types,
            vec!["application/vnd.api+json", "text/x-json"]
        );
    }

    #[test]
    fn test_flag_accepts_any_non_empty_value() {
        assert_eq!(parse_flag("yes"), Ok(true));
        assert_eq!(parse_flag("0"), Ok(true));
        assert_eq!(parse_flag(""), Ok(false));
    }

    #[test]
    fn test_defaults_to_replay() {
        let config = Cli::default().into_config().unwrap();
        assert_eq!(config.mode, ServerMode::Replay);
        assert_eq!(config.port, 8080);
        assert_eq!(config.referer_path, "/");
    }

    #[test]
    fn test_record_without_upstream_is_rejected() {
        let cli = Cli {
            mode: Some(ServerMode::Record),
            ..Default::default()
        };
        assert!(cli.into_config().is_err());
    }
}
