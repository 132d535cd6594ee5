//! Node Assembly
//!
//! Wires one process worth of components: the fragment table, the HTTP router
//! on top of it, and the anti-entropy synchronizer pulling from the peer set.
//! Everything is built from a single immutable `NodeConfig`.

use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::NodeConfig;
use crate::storage::handlers::{handle_get, handle_get_missing_key, handle_put, handle_sync};
use crate::storage::protocol::{ENDPOINT_GET, ENDPOINT_PUT, ENDPOINT_SYNC};
use crate::storage::table::FragmentTable;
use crate::sync::Synchronizer;

pub struct Node {
    pub id: String,
    pub table: Arc<FragmentTable>,
    pub synchronizer: Arc<Synchronizer>,
    config: NodeConfig,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        let table = Arc::new(FragmentTable::new(
            config.shard_count,
            config.cluster_secret(),
        ));
        let synchronizer = Synchronizer::new(
            table.clone(),
            config.peer_nodes.clone(),
            config.sync_config(),
        );

        Self {
            id: config.node_id.clone(),
            table,
            synchronizer,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        router(self.table.clone())
    }

    /// Serves HTTP on `listener` and runs anti-entropy until `shutdown` resolves.
    ///
    /// The synchronizer is cancelled and awaited after the server has drained.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let sync_handle = self.synchronizer.clone().spawn(cancel.clone());

        tracing::info!(
            "Node {} listening on {} ({} shards, {} peers)",
            self.id,
            listener.local_addr()?,
            self.config.shard_count,
            self.config.peer_nodes.len()
        );

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        cancel.cancel();
        if let Err(e) = sync_handle.await {
            tracing::error!("Anti-entropy task ended abnormally: {}", e);
        }

        served?;
        tracing::info!("Node {} stopped", self.id);
        Ok(())
    }

    /// Binds `0.0.0.0:<port>` and serves until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }
}

/// HTTP surface over a fragment table.
pub fn router(table: Arc<FragmentTable>) -> Router {
    Router::new()
        .route(ENDPOINT_PUT, post(handle_put))
        .route(&format!("{}/", ENDPOINT_GET), get(handle_get_missing_key))
        .route(&format!("{}/*key", ENDPOINT_GET), get(handle_get))
        .route(ENDPOINT_SYNC, get(handle_sync))
        .layer(Extension(table))
}

#[cfg(test)]
mod tests;
