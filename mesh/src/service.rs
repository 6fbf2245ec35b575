//! HTTP surface of a gossip node
//!
//! Routes:
//! - `POST /gossip` - merge a peer's table, answer with the merged table
//! - `GET  /state`  - current table, read only
//! - `POST /`       - write local attributes from a flat string map

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{
    error::{MeshError, MeshResult},
    node::GossipNode,
    state::ClusterState,
    transport::{GOSSIP_PATH, JSON_CONTENT_TYPE},
};

pub const STATE_PATH: &str = "/state";

pub fn build_router(node: Arc<GossipNode>) -> Router {
    Router::new()
        .route("/", post(set_attributes))
        .route(GOSSIP_PATH, post(gossip))
        .route(STATE_PATH, get(state))
        .with_state(node)
}

async fn gossip(State(node): State<Arc<GossipNode>>, headers: HeaderMap, body: Bytes) -> Response {
    let incoming: ClusterState = match decode_json(&headers, &body) {
        Ok(incoming) => incoming,
        Err(e) => {
            metrics::counter!("gossip_inbound_total", "outcome" => "rejected").increment(1);
            warn!("Rejected gossip request: {}", e);
            return e.into_response();
        }
    };

    metrics::counter!("gossip_inbound_total", "outcome" => "ok").increment(1);
    Json(node.handle_gossip(incoming).await).into_response()
}

async fn state(State(node): State<Arc<GossipNode>>) -> Json<ClusterState> {
    Json(node.snapshot().await)
}

async fn set_attributes(
    State(node): State<Arc<GossipNode>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let attributes: BTreeMap<String, String> = match decode_json(&headers, &body) {
        Ok(attributes) => attributes,
        Err(e) => return e.into_response(),
    };

    node.set_local_attributes(&attributes).await;
    StatusCode::OK.into_response()
}

/// Decode a JSON body, insisting on a JSON content type first.
fn decode_json<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> MeshResult<T> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !is_json(content_type) {
        return Err(MeshError::UnsupportedContentType(content_type.to_string()));
    }

    serde_json::from_slice(body).map_err(MeshError::Decode)
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}
