//! Mesh error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Failed to bind gossip listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close gossip listener: {0}")]
    ListenerClose(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Malformed gossip payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode cluster state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Peer {peer} answered with status {status}")]
    PeerStatus { peer: String, status: StatusCode },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MeshError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MeshError::UnsupportedContentType(_) | MeshError::Decode(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MeshError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
