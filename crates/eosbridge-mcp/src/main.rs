use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use eosbridge_control::config::CONFIG_PATH_VAR;
use eosbridge_control::{EosClient, EosConfig};
use eosbridge_mcp::{logging_setup, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_PATH_VAR))
        .map(PathBuf::from);

    let config = EosConfig::load(config_path.as_deref())
        .context("Failed to load configuration")?;
    let _log_guard = logging_setup::init(&config.log)?;

    let client = EosClient::from_config(&config)
        .context("Failed to create Eos client")?;
    let client = Arc::new(client);
    tracing::info!(
        "Eos console at {}:{} as user {}",
        config.host,
        config.port,
        config.user_id
    );
    if config.enable_rx {
        client
            .start_receiver()
            .with_context(|| format!("Failed to listen for feedback on port {}", config.rx_port))?;
        tracing::info!("Listening for console feedback on UDP port {}", config.rx_port);
    }

    let server = McpServer::new(client.clone());
    eprintln!("Starting eosbridge MCP server on stdio...");
    let result = server.run_stdio().await;

    client.shutdown();
    result
}
