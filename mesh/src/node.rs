//! Gossip node: the shared cluster table and the operations that touch it
//!
//! Inbound exchanges, local writes and the periodic outbound round all go
//! through one exclusive lock. The outbound round keeps the lock for the whole
//! network exchange, so it is serialized with inbound handling on this node.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rand::{seq::IndexedRandom, Rng};
use tokio::sync::{watch, Mutex};
use tracing as log;
use tracing::instrument;

use super::{
    error::MeshResult,
    state::{ClusterState, ADDRESS_KEY},
    transport::GossipTransport,
};

pub struct GossipNode {
    id: String,
    seeds: Vec<String>,
    state: Mutex<ClusterState>,
    transport: Arc<dyn GossipTransport>,
}

impl std::fmt::Debug for GossipNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GossipNode")
            .field("id", &self.id)
            .field("seeds", &self.seeds)
            .finish()
    }
}

impl GossipNode {
    /// Create a node whose table already carries its own address.
    pub fn new(
        id: impl Into<String>,
        seeds: Vec<String>,
        transport: Arc<dyn GossipTransport>,
    ) -> Self {
        let id = id.into();
        let mut state = ClusterState::new();
        state.set(&id, ADDRESS_KEY, &id);
        log::info!("Gossip node {} created with {} seed(s)", id, seeds.len());
        Self {
            id,
            seeds,
            state: Mutex::new(state),
            transport,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of the current table.
    pub async fn snapshot(&self) -> ClusterState {
        self.state.lock().await.clone()
    }

    /// Write an attribute of this node. Returns whether anything changed.
    pub async fn set_local_attribute(&self, key: &str, value: &str) -> bool {
        log::info!("Setting key {} to {}", key, value);
        self.state.lock().await.set(&self.id, key, value)
    }

    /// Write a batch of attributes under a single lock acquisition, so no
    /// outbound round can observe part of it. Returns how many keys changed.
    pub async fn set_local_attributes(&self, attributes: &BTreeMap<String, String>) -> usize {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for (key, value) in attributes {
            log::info!("Setting key {} to {}", key, value);
            if state.set(&self.id, key, value) {
                changed += 1;
            }
        }
        changed
    }

    /// Merge a peer's table and answer with the merged result.
    pub async fn handle_gossip(&self, incoming: ClusterState) -> ClusterState {
        let mut state = self.state.lock().await;
        let applied = state.merge(&incoming);
        log::debug!(
            "Inbound gossip touched {} node(s), {} known",
            applied.len(),
            state.len()
        );
        record_state(&state);
        state.clone()
    }

    /// One outbound exchange with a random known peer, or a random seed while
    /// no peer is known.
    ///
    /// Returns the peer gossiped with, or `None` when there was nobody to
    /// contact. On failure the local table is left untouched.
    pub async fn do_gossip_round(&self) -> MeshResult<Option<String>> {
        let mut state = self.state.lock().await;

        let Some(peer) = self.select_peer(&state) else {
            return Ok(None);
        };

        let reply = self.transport.exchange(&peer, &state).await?;
        let applied = state.merge(&reply);
        log::debug!(
            "Gossip with {} touched {} node(s), {} known",
            peer,
            applied.len(),
            state.len()
        );
        record_state(&state);

        Ok(Some(peer))
    }

    fn select_peer(&self, state: &ClusterState) -> Option<String> {
        let live = state.live_peers(&self.id);
        let pool = if live.is_empty() { &self.seeds } else { &live };
        pool.choose(&mut rand::rng()).cloned()
    }

    /// Run a gossip round roughly every `period` until `signal` fires.
    ///
    /// Shutdown is only observed between rounds. Each pause carries up to 10%
    /// random jitter so two nodes that block on each other once do not stay
    /// in lockstep.
    #[instrument(fields(node = %self.id), skip(self, signal))]
    pub async fn gossip_loop(self: Arc<Self>, period: Duration, mut signal: watch::Receiver<()>) {
        let mut round: u64 = 0;

        loop {
            round += 1;
            match self.do_gossip_round().await {
                Ok(Some(peer)) => {
                    metrics::counter!("gossip_rounds_total", "outcome" => "ok").increment(1);
                    log::debug!("Round {} gossiped with {}", round, peer);
                }
                Ok(None) => {
                    metrics::counter!("gossip_rounds_total", "outcome" => "idle").increment(1);
                    log::debug!("Round {}: no peer address available", round);
                }
                Err(e) => {
                    metrics::counter!("gossip_rounds_total", "outcome" => "error").increment(1);
                    log::warn!("Round {} abandoned: {}", round, e);
                }
            }

            tokio::select! {
                _ = signal.changed() => {
                    log::info!("Gossip loop of {} is shutting down after {} round(s)", self.id, round);
                    break;
                }

                _ = tokio::time::sleep(jittered(period)) => {}
            }
        }
    }
}

fn jittered(period: Duration) -> Duration {
    let spread = period / 10;
    period + rand::rng().random_range(Duration::ZERO..=spread)
}

fn record_state(state: &ClusterState) {
    metrics::gauge!("gossip_known_nodes").set(state.len() as f64);
    if log::enabled!(log::Level::DEBUG) {
        if let Ok(json) = serde_json::to_string(state) {
            log::debug!("Cluster state: {}", json);
        }
    }
}
