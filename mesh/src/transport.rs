//! Outbound state exchange
//!
//! A gossip round pushes the full local table to one peer and gets the peer's
//! post-merge table back. [`GossipTransport`] is the seam the node talks to;
//! [`HttpTransport`] is the JSON-over-HTTP implementation served by
//! [`crate::service`].

use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use tracing::debug;

use super::{
    error::{MeshError, MeshResult},
    state::ClusterState,
};

pub const GOSSIP_PATH: &str = "/gossip";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[async_trait]
pub trait GossipTransport: Send + Sync {
    /// Send `state` to `peer` and return the peer's reply.
    async fn exchange(&self, peer: &str, state: &ClusterState) -> MeshResult<ClusterState>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> MeshResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GossipTransport for HttpTransport {
    async fn exchange(&self, peer: &str, state: &ClusterState) -> MeshResult<ClusterState> {
        let body = serde_json::to_vec(state).map_err(MeshError::Encode)?;
        let url = format!("http://{}{}", peer, GOSSIP_PATH);
        debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeshError::PeerStatus {
                peer: peer.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(MeshError::Decode)
    }
}
