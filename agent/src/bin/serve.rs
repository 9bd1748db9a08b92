use std::sync::Arc;

use agent::{config::AgentConfig, telemetry, Agent};
use tokio::signal::unix::{signal, SignalKind};

/// Runs the price-feed ingest loop and commit/reveal scheduler until
/// SIGINT, SIGTERM or SIGQUIT (spec §6, mirroring the original's
/// `app.Serve`).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AgentConfig::from_env()?;
    tracing::info!(
        chain_id = %config.chain_id,
        tokens = config.tokens.len(),
        "starting oracle agent"
    );

    let agent = Arc::new(Agent::bootstrap(&config).await?);
    tracing::info!(assets = agent.catalog.entries().len(), "asset catalog resolved");

    let stop_agent = agent.clone();
    tokio::spawn(async move {
        wait_for_stop_signal().await;
        tracing::info!("stop signal received, shutting down");
        stop_agent.stop();
    });

    agent.run().await
}

async fn wait_for_stop_signal() {
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigquit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
        _ = sigquit.recv() => {}
    }
}
