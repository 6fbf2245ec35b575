use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::Notify;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{
    error::{MeshError, MeshResult},
    state::ClusterState,
    transport::GossipTransport,
};

static INIT: Once = Once::new();

/// Initialize test logging infrastructure
pub(crate) fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init();
    });
}

/// Transport double that records every exchange and answers with a fixed
/// table, or fails when no reply is configured.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    reply: Option<ClusterState>,
    calls: Mutex<Vec<(String, ClusterState)>>,
}

impl RecordingTransport {
    pub(crate) fn replying(reply: ClusterState) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply),
            ..Self::default()
        })
    }

    pub(crate) fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(peer, _)| peer.clone())
            .collect()
    }

    pub(crate) fn sent(&self) -> Vec<ClusterState> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, state)| state.clone())
            .collect()
    }
}

#[async_trait]
impl GossipTransport for RecordingTransport {
    async fn exchange(&self, peer: &str, state: &ClusterState) -> MeshResult<ClusterState> {
        self.calls
            .lock()
            .unwrap()
            .push((peer.to_string(), state.clone()));
        self.reply.clone().ok_or_else(|| MeshError::PeerStatus {
            peer: peer.to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        })
    }
}

/// Transport double that parks every exchange until the test releases it.
#[derive(Default)]
pub(crate) struct GatedTransport {
    entered: Notify,
    release: Notify,
}

impl GatedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Resolves once an exchange has started.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl GossipTransport for GatedTransport {
    async fn exchange(&self, _peer: &str, _state: &ClusterState) -> MeshResult<ClusterState> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ClusterState::new())
    }
}
