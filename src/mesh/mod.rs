//! Gossip mesh
//!
//! Re-exports the gossip-mesh crate so the binary and embedders share one path.

pub use gossip_mesh::*;
