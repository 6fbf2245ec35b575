//! Command line surface of the `gossip` binary

use std::time::Duration;

use clap::Parser;

use crate::mesh::GossipConfig;

/// Run an anti-entropy gossip node.
#[derive(Parser, Debug, Clone)]
#[command(name = "gossip", version, about)]
pub struct Cli {
    /// Address to listen on; a bare `:port` listens on all interfaces
    #[arg(long, default_value = ":8080", env = "GOSSIP_ADDR")]
    pub addr: String,

    /// Seed peer (host:port), repeatable or comma separated
    #[arg(long = "seed", value_delimiter = ',', env = "GOSSIP_SEEDS")]
    pub seeds: Vec<String>,

    /// Pause between gossip rounds
    #[arg(long, default_value_t = 1000, env = "GOSSIP_INTERVAL_MS")]
    pub gossip_interval_ms: u64,

    /// Timeout for one outbound exchange
    #[arg(long, default_value_t = 5000, env = "GOSSIP_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Node id to publish instead of the resolved listen address
    #[arg(long, env = "GOSSIP_ADVERTISE_ADDR")]
    pub advertise_addr: Option<String>,

    #[arg(long, default_value = "info", env = "GOSSIP_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn gossip_config(&self) -> GossipConfig {
        let mut config = GossipConfig::new(self.seeds.clone())
            .with_gossip_interval(Duration::from_millis(self.gossip_interval_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms));
        if let Some(addr) = &self.advertise_addr {
            config = config.with_advertise_addr(addr.clone());
        }
        config
    }
}
