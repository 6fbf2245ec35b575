//! Gossip node configuration

use std::time::Duration;

use super::error::{MeshError, MeshResult};

/// Reference gossip cadence.
pub const DEFAULT_GOSSIP_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on a single outbound exchange, connect included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct GossipConfig {
    /// Peers contacted while no other node is known yet.
    pub seeds: Vec<String>,
    pub gossip_interval: Duration,
    pub request_timeout: Duration,
    /// Node id to publish instead of the resolved listen address.
    pub advertise_addr: Option<String>,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            gossip_interval: DEFAULT_GOSSIP_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            advertise_addr: None,
        }
    }
}

impl GossipConfig {
    pub fn new(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            ..Self::default()
        }
    }

    pub fn with_gossip_interval(mut self, interval: Duration) -> Self {
        self.gossip_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_advertise_addr(mut self, addr: impl Into<String>) -> Self {
        self.advertise_addr = Some(addr.into());
        self
    }

    /// Reject settings that would spin the gossip loop or fail every exchange.
    pub fn validate(&self) -> MeshResult<()> {
        if self.gossip_interval.is_zero() {
            return Err(MeshError::Config(
                "gossip interval must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(MeshError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand a bare `:port` into an all-interfaces address.
pub fn normalize_bind_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    }
}
