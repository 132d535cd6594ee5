//! Node Tests
//!
//! Drives the HTTP surface of a node over loopback and checks that two nodes
//! converge through anti-entropy.
//!
//! ## Test Scopes
//! - **HTTP Surface**: put/get round trips, keys containing `/`, status codes, snapshot encoding.
//! - **Replication**: two running nodes converging, then shutting down cleanly.

#[cfg(test)]
mod tests {
    use crate::node::{Node, router};
    use crate::config::NodeConfig;
    use crate::storage::protocol::{GetResponse, PutResponse, SyncSnapshot};
    use serde_json::json;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn config(peers: Vec<String>) -> NodeConfig {
        NodeConfig::from_json(
            &json!({
                "node_id": "test-node",
                "port": 0,
                "peer_nodes": peers,
                "secret_key": "12345678901234567890123456789012",
                "shard_count": 3,
                "sync_interval_secs": 1,
            })
            .to_string(),
        )
        .unwrap()
    }

    async fn start_router(node: &Node) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(node.table.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    // ============================================================
    // HTTP SURFACE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_http_put_then_get() {
        let node = Node::new(config(vec![]));
        let base = start_router(&node).await;
        let client = reqwest::Client::new();

        let put = client
            .post(format!("{}/put", base))
            .json(&json!({ "key": "test-key", "value": "Hello, World!" }))
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), reqwest::StatusCode::OK);
        assert!(put.json::<PutResponse>().await.unwrap().success);

        let get = client
            .get(format!("{}/get/test-key", base))
            .send()
            .await
            .unwrap();
        assert_eq!(get.status(), reqwest::StatusCode::OK);
        let body: GetResponse = get.json().await.unwrap();
        assert_eq!(body.key, "test-key");
        assert_eq!(body.value, "Hello, World!");
    }

    #[tokio::test]
    async fn test_http_key_with_slashes_roundtrip() {
        let node = Node::new(config(vec![]));
        assert_eq!(node.config().shard_count, 3);
        let base = start_router(&node).await;
        let client = reqwest::Client::new();

        let put = client
            .post(format!("{}/put", base))
            .json(&json!({ "key": "users/42", "value": "alice" }))
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), reqwest::StatusCode::OK);

        let get = client
            .get(format!("{}/get/users/42", base))
            .send()
            .await
            .unwrap();
        assert_eq!(get.status(), reqwest::StatusCode::OK);
        let body: GetResponse = get.json().await.unwrap();
        assert_eq!(body.key, "users/42");
        assert_eq!(body.value, "alice");
    }

    #[tokio::test]
    async fn test_http_get_unknown_key_is_404() {
        let node = Node::new(config(vec![]));
        let base = start_router(&node).await;

        let response = reqwest::get(format!("{}/get/missing", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_http_missing_key_is_400() {
        let node = Node::new(config(vec![]));
        let base = start_router(&node).await;
        let client = reqwest::Client::new();

        let get = client.get(format!("{}/get/", base)).send().await.unwrap();
        assert_eq!(get.status(), reqwest::StatusCode::BAD_REQUEST);

        let put = client
            .post(format!("{}/put", base))
            .json(&json!({ "key": "", "value": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_http_put_rejects_malformed_body() {
        let node = Node::new(config(vec![]));
        let base = start_router(&node).await;

        let response = reqwest::Client::new()
            .post(format!("{}/put", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(node.table.is_empty().await);
    }

    #[tokio::test]
    async fn test_http_sync_serves_sealed_snapshot() {
        let node = Node::new(config(vec![]));
        node.table.put("k", b"value").await.unwrap();
        let base = start_router(&node).await;

        let response = reqwest::get(format!("{}/sync", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let raw: serde_json::Value = response.json().await.unwrap();
        assert!(raw["k:0"].is_string(), "Ciphertext travels as base64 text");

        let snapshot: SyncSnapshot = serde_json::from_value(raw).unwrap();
        assert_eq!(snapshot.entries, node.table.snapshot().await);
    }

    #[tokio::test]
    async fn test_http_get_with_wrong_secret_is_500() {
        let writer = Node::new(config(vec![]));
        writer.table.put("k", b"value").await.unwrap();

        let mut other = config(vec![]);
        other.secret_key = "abcdefghijklmnopqrstuvwxyz012345".to_string();
        let reader = Node::new(other);
        reader.table.merge_missing(writer.table.snapshot().await).await;
        let base = start_router(&reader).await;

        let response = reqwest::get(format!("{}/get/k", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ============================================================
    // REPLICATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_two_nodes_converge_and_shut_down() {
        let listener_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr_a = listener_a.local_addr().unwrap().to_string();

        let node_b = Node::new(config(vec![]));
        let base_b = start_router(&node_b).await;
        node_b.table.put("shared", b"written on b").await.unwrap();

        let node_a = std::sync::Arc::new(Node::new(config(vec![base_b])));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = {
            let node_a = node_a.clone();
            tokio::spawn(async move {
                node_a
                    .serve(listener_a, async move {
                        let _ = stop_rx.await;
                    })
                    .await
            })
        };

        let client = reqwest::Client::new();
        let mut value = None;
        for _ in 0..50 {
            let response = client
                .get(format!("http://{}/get/shared", addr_a))
                .send()
                .await
                .unwrap();
            if response.status() == reqwest::StatusCode::OK {
                value = Some(response.json::<GetResponse>().await.unwrap().value);
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(value.as_deref(), Some("written on b"));

        drop(client);
        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert_eq!(
            node_a.synchronizer.state(),
            crate::sync::SyncState::Stopped
        );
    }
}
