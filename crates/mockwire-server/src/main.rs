use clap::Parser;
use mockwire_server::config::Cli;
use mockwire_server::mapping::load_mappings_dir;
use mockwire_server::server::{MockServer, ServerState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Cli::parse().into_config()?;

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting mockwire v{}", env!("CARGO_PKG_VERSION"));

    let mappings_dir = config.mappings_dir.clone();
    let state = Arc::new(ServerState::new(config)?);

    if let Some(dir) = mappings_dir {
        match load_mappings_dir(&dir) {
            Ok(mappings) => {
                let count = state.stubs.import(mappings);
                info!("Imported {} mappings from {}", count, dir.display());
            }
            Err(e) => warn!("Could not load mappings: {}", e),
        }
    }

    let server = MockServer::bind(state).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}
