use fragmentdb::config::NodeConfig;
use fragmentdb::node::Node;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = args[i + 1].clone();
                i += 2;
            }
            "-h" | "--help" => {
                eprintln!("Usage: {} [--config <path>]", args[0]);
                eprintln!("Example: {} --config node1.json", args[0]);
                return Ok(());
            }
            other => {
                tracing::warn!("Ignoring unknown argument {}", other);
                i += 1;
            }
        }
    }

    let config = NodeConfig::load(&config_path)?;
    tracing::info!("Loaded config from {}", config_path);
    if config.peer_nodes.is_empty() {
        tracing::info!("No peers configured, anti-entropy will idle");
    } else {
        tracing::info!("Peers: {:?}", config.peer_nodes);
    }

    let node = Node::new(config);
    tracing::info!(
        "Node {} using {} shards, sync every {}s",
        node.id,
        node.config().shard_count,
        node.config().sync_interval_secs
    );
    node.run(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
