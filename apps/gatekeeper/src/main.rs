use anyhow::{Context, Result};
use dotenv::dotenv;
use gatekeeper::{TokenGate, config::GateConfig, rpc::AlloyMulticallClient, server::router};
use std::sync::Arc;
use tracing::{error, info, warn};
use utils::tracing::setup_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_tracing();
    info!("Gatekeeper starting up");

    let config = GateConfig::from_env()?;
    let client = AlloyMulticallClient::connect(&config.rpc_url, config.multicall)?;

    match client.chain_id().await {
        Ok(chain_id) if chain_id == config.chain_id => {
            info!(chain_id = chain_id, "Connected to RPC node");
        }
        Ok(chain_id) => {
            warn!(
                expected = config.chain_id,
                actual = chain_id,
                "RPC node is on a different chain than configured"
            );
        }
        Err(e) => {
            warn!(error = %e, "Could not verify chain id, continuing");
        }
    }

    let bind_addr = config.bind_addr;
    let gate = Arc::new(TokenGate::new(config, client));
    let app = router(gate);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .context("Failed to bind HTTP listener")?;
    let addr = listener.local_addr()?;

    let server_handle = tokio::spawn(async move {
        info!(address = %addr, "Starting entitlement server");
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Entitlement server error");
        }
    });

    tokio::select! {
        result = server_handle => {
            error!("Server task completed unexpectedly: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }

    info!("Application shutting down");
    Ok(())
}
