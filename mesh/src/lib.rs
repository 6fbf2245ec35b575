//! Anti-entropy gossip for a versioned cluster state table
//!
//! Each node keeps a table of node id -> attribute -> versioned value. Once
//! per interval it pushes the whole table to a random known peer (or a seed,
//! while it knows nobody) and merges the peer's reply. Merging keeps the
//! higher version of every key, so repeated exchanges converge.
//!
//! There is no failure detection or eviction: every address learned stays a
//! gossip target for the lifetime of the process.

pub mod config;
pub mod error;
pub mod node;
pub mod server;
pub mod service;
pub mod state;
pub mod transport;
pub mod versioned;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::{normalize_bind_addr, GossipConfig};
pub use error::{MeshError, MeshResult};
pub use node::GossipNode;
pub use server::{start, MeshServer};
pub use service::build_router;
pub use state::{ClusterState, NodeState, ADDRESS_KEY};
pub use transport::{GossipTransport, HttpTransport};
pub use versioned::VersionedValue;
