//! Listener lifecycle of a gossip node
//!
//! [`MeshServer::bind`] claims the address and fixes the node id;
//! [`MeshServer::run`] serves the HTTP surface and drives the gossip loop
//! until the shutdown signal fires. [`start`] does both.

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, sync::watch, task::JoinError};
use tracing::info;

use super::{
    config::{normalize_bind_addr, GossipConfig},
    error::{MeshError, MeshResult},
    node::GossipNode,
    service::build_router,
    transport::{GossipTransport, HttpTransport},
};

pub struct MeshServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    node: Arc<GossipNode>,
    config: GossipConfig,
}

impl MeshServer {
    /// Bind `addr` and create the node, talking to peers over HTTP.
    pub async fn bind(addr: &str, config: GossipConfig) -> MeshResult<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
        Self::bind_with_transport(addr, config, transport).await
    }

    pub async fn bind_with_transport(
        addr: &str,
        config: GossipConfig,
        transport: Arc<dyn GossipTransport>,
    ) -> MeshResult<Self> {
        config.validate()?;
        let addr = normalize_bind_addr(addr);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| MeshError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| MeshError::Bind { addr, source })?;

        let id = config
            .advertise_addr
            .clone()
            .unwrap_or_else(|| local_addr.to_string());
        let node = Arc::new(GossipNode::new(id, config.seeds.clone(), transport));

        info!("Gossip node {} listening on {}", node.id(), local_addr);

        Ok(Self {
            listener,
            local_addr,
            node,
            config,
        })
    }

    /// Resolved listen address.
    pub fn address(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn node(&self) -> Arc<GossipNode> {
        self.node.clone()
    }

    /// Serve and gossip until `signal` fires (or its sender goes away), then
    /// close the listener.
    ///
    /// In-flight requests and an in-flight gossip round run to completion.
    pub async fn run(self, mut signal: watch::Receiver<()>) -> MeshResult<()> {
        let Self {
            listener,
            local_addr,
            node,
            config,
        } = self;

        let app = build_router(node.clone());
        let mut server_signal = signal.clone();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = server_signal.changed().await;
                })
                .await
        });

        let gossip = tokio::spawn(
            node.clone()
                .gossip_loop(config.gossip_interval, signal.clone()),
        );

        let _ = signal.changed().await;
        info!("Gossip node {} at {} is shutting down", node.id(), local_addr);

        if let Err(e) = gossip.await {
            tracing::warn!("Gossip loop of {} ended abnormally: {}", node.id(), e);
        }

        close_result(server.await)
    }
}

fn close_result(joined: Result<std::io::Result<()>, JoinError>) -> MeshResult<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(MeshError::ListenerClose(e.to_string())),
        Err(e) => Err(MeshError::ListenerClose(e.to_string())),
    }
}

/// Bind `addr` and run the node until `signal` fires.
pub async fn start(addr: &str, config: GossipConfig, signal: watch::Receiver<()>) -> MeshResult<()> {
    MeshServer::bind(addr, config).await?.run(signal).await
}
