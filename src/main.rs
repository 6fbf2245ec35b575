use anyhow::{Context, Result};
use clap::Parser;
use gossip_node::{cli::Cli, logging::init_logging, mesh};
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json).context("failed to initialize logging")?;

    let config = cli.gossip_config();
    info!(addr = %cli.addr, seeds = ?config.seeds, "starting gossip node");

    let server = mesh::MeshServer::bind(&cli.addr, config)
        .await
        .with_context(|| format!("failed to start gossip node on {}", cli.addr))?;

    let (tx, rx) = watch::channel(());
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = tx.send(());
        // Keep the sender alive until the node has observed the signal
        std::future::pending::<()>().await;
    });

    server.run(rx).await.context("gossip node failed")?;
    info!("gossip node stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
