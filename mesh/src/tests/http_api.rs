use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::{
    node::GossipNode,
    service::build_router,
    state::{ClusterState, ADDRESS_KEY},
    test_utils::{init_test_logging, RecordingTransport},
    versioned::VersionedValue,
};

fn test_node() -> (Arc<GossipNode>, Router) {
    init_test_logging();
    let node = Arc::new(GossipNode::new(
        "127.0.0.1:9000",
        vec![],
        RecordingTransport::unreachable(),
    ));
    let app = build_router(node.clone());
    (node, app)
}

fn json_request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_malformed_gossip_body_is_rejected() {
    let (node, app) = test_node();
    let before = node.snapshot().await;

    let response = app
        .oneshot(json_request(Method::POST, "/gossip", "not-json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(node.snapshot().await, before);
}

#[tokio::test]
async fn test_gossip_requires_json_content_type() {
    let (node, app) = test_node();
    let before = node.snapshot().await;

    let plain = Request::builder()
        .method(Method::POST)
        .uri("/gossip")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"x":{}}"#))
        .unwrap();
    let response = app.clone().oneshot(plain).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = Request::builder()
        .method(Method::POST)
        .uri("/gossip")
        .body(Body::from(r#"{"x":{}}"#))
        .unwrap();
    let response = app.oneshot(missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(node.snapshot().await, before);
}

#[tokio::test]
async fn test_gossip_with_wrong_shape_is_rejected() {
    let (node, app) = test_node();
    let before = node.snapshot().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/gossip",
            r#"{"peer":{"address":{"version":-3,"value":"peer"}}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(node.snapshot().await, before);
}

#[tokio::test]
async fn test_gossip_replies_with_merged_state() {
    let (node, app) = test_node();
    let mut incoming = ClusterState::new();
    incoming.set("127.0.0.1:9001", ADDRESS_KEY, "127.0.0.1:9001");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/gossip",
            serde_json::to_vec(&incoming).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let reply: ClusterState = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(reply.contains_node("127.0.0.1:9000"));
    assert!(reply.contains_node("127.0.0.1:9001"));
    assert_eq!(reply, node.snapshot().await);
}

#[tokio::test]
async fn test_state_is_readable_without_content_type() {
    let (node, app) = test_node();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/state")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let state: ClusterState = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(state, node.snapshot().await);
}

#[tokio::test]
async fn test_set_attributes_writes_local_state() {
    let (node, app) = test_node();

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/", r#"{"role":"seed","zone":"a"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(Method::POST, "/", r#"{"role":"seed","zone":"b"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let state = node.snapshot().await;
    assert_eq!(
        state.attribute("127.0.0.1:9000", "role"),
        Some(&VersionedValue::new("seed"))
    );
    assert_eq!(
        state.attribute("127.0.0.1:9000", "zone"),
        Some(&VersionedValue::with_version("b", 1))
    );
}

#[tokio::test]
async fn test_set_attributes_rejects_non_string_values() {
    let (node, app) = test_node();
    let before = node.snapshot().await;

    let response = app
        .oneshot(json_request(Method::POST, "/", r#"{"role":42}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(node.snapshot().await, before);
}
