//! Anti-Entropy Synchronizer
//!
//! On a fixed interval, pulls the full sealed table of every configured peer and
//! merges the entries this node is missing.
//!
//! ## Behaviour
//! - **Fan-out**: one task per peer per cycle, no concurrency limit.
//! - **Locking**: the fetch completes before the table lock is taken for the merge.
//! - **Failures**: an unreachable, failing or malformed peer is logged and skipped. There
//!   is no retry inside a cycle; the next tick is the retry.
//! - **Shutdown**: a `CancellationToken` stops scheduling new cycles. A cycle already
//!   running is allowed to finish, since each merge is safe on its own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::storage::protocol::{ENDPOINT_SYNC, SyncSnapshot};
use crate::storage::table::{FragmentTable, MergeReport};

const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between two cycles. The first cycle runs one interval after start.
    pub interval: Duration,
    /// Upper bound on a single peer fetch, connect included.
    pub request_timeout: Duration,
    /// Path of the snapshot endpoint on peers.
    pub sync_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sync_path: ENDPOINT_SYNC.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
    Stopped,
}

/// Summary of one synchronization cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub peers_contacted: usize,
    pub peers_failed: usize,
    pub inserted: usize,
}

pub struct Synchronizer {
    table: Arc<FragmentTable>,
    peers: Vec<String>,
    config: SyncConfig,
    http_client: reqwest::Client,
    state: watch::Sender<SyncState>,
}

impl Synchronizer {
    pub fn new(table: Arc<FragmentTable>, peers: Vec<String>, config: SyncConfig) -> Arc<Self> {
        let (state, _) = watch::channel(SyncState::Idle);
        Arc::new(Self {
            table,
            peers,
            config,
            http_client: reqwest::Client::new(),
            state,
        })
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Starts the periodic loop in the background.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Anti-entropy started: {} peer(s), every {:?}",
            self.peers.len(),
            period
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Anti-entropy shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    tracing::info!(
                        "Sync cycle done: contacted={} failed={} inserted={}",
                        report.peers_contacted,
                        report.peers_failed,
                        report.inserted
                    );
                }
            }
        }

        self.state.send_replace(SyncState::Stopped);
    }

    /// Runs one full cycle against every peer and waits for all of them.
    ///
    /// Callable directly as well; once the loop has stopped the state stays
    /// `Stopped`, but merges still apply.
    pub async fn run_cycle(self: &Arc<Self>) -> CycleReport {
        self.state.send_if_modified(|state| {
            if *state == SyncState::Idle {
                *state = SyncState::Running;
                true
            } else {
                false
            }
        });

        let mut tasks = JoinSet::new();
        for peer in self.peers.iter().cloned() {
            let sync = self.clone();
            tasks.spawn(async move {
                let result = sync.sync_with_peer(&peer).await;
                (peer, result)
            });
        }

        let mut report = CycleReport::default();
        while let Some(joined) = tasks.join_next().await {
            report.peers_contacted += 1;
            match joined {
                Ok((peer, Ok(merge))) => {
                    tracing::debug!(
                        "Merged from {}: inserted={} skipped={}",
                        peer,
                        merge.inserted,
                        merge.skipped
                    );
                    report.inserted += merge.inserted;
                }
                Ok((_, Err(e))) => {
                    tracing::warn!("Skipping peer this cycle: {}", e);
                    report.peers_failed += 1;
                }
                Err(e) => {
                    tracing::error!("Peer sync task failed: {}", e);
                    report.peers_failed += 1;
                }
            }
        }

        // Keep Stopped if the periodic loop ended while this cycle ran.
        self.state.send_if_modified(|state| {
            if *state == SyncState::Running {
                *state = SyncState::Idle;
                true
            } else {
                false
            }
        });

        report
    }

    async fn sync_with_peer(&self, peer: &str) -> Result<MergeReport, SyncError> {
        let foreign = self.fetch_snapshot(peer).await?;
        Ok(self.table.merge_missing(foreign).await)
    }

    /// Pulls one peer's full sealed table.
    pub async fn fetch_snapshot(&self, peer: &str) -> Result<HashMap<String, Vec<u8>>, SyncError> {
        let url = self.peer_url(peer);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|source| SyncError::PeerUnreachable {
                peer: peer.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SyncError::PeerStatus {
                peer: peer.to_string(),
                status: response.status(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SyncError::PeerUnreachable {
                peer: peer.to_string(),
                source,
            })?;

        let snapshot: SyncSnapshot =
            serde_json::from_slice(&body).map_err(|e| SyncError::MalformedPeerResponse {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;

        Ok(snapshot.entries)
    }

    fn peer_url(&self, peer: &str) -> String {
        let base = peer.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}{}", base, self.config.sync_path)
        } else {
            format!("http://{}{}", base, self.config.sync_path)
        }
    }
}
