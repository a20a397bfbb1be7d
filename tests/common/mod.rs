//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;

use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const CA_PEM: &str = include_str!("../fixtures/ca.pem");
pub const SECOND_CA_PEM: &str = include_str!("../fixtures/second-ca.pem");

/// A cluster proxy item with the given status.
pub fn proxy_item(http_proxy: &str, https_proxy: &str, no_proxy: &str) -> Value {
    json!({
        "kind": "Proxy",
        "apiVersion": "config.openshift.io/v1",
        "metadata": {"name": "cluster"},
        "status": {
            "httpProxy": http_proxy,
            "httpsProxy": https_proxy,
            "noProxy": no_proxy,
        }
    })
}

/// A ConfigMap item with a single data entry.
pub fn config_map_item(namespace: &str, name: &str, key: &str, value: &str) -> Value {
    json!({
        "kind": "ConfigMap",
        "apiVersion": "v1",
        "metadata": {"name": name, "namespace": namespace},
        "data": {key: value},
    })
}

/// Serialize items as a snapshot list.
pub fn snapshot_json(items: Vec<Value>) -> String {
    json!({"apiVersion": "v1", "kind": "List", "items": items}).to_string()
}

/// Write a snapshot to a temporary file.
pub fn write_snapshot(items: Vec<Value>) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(snapshot_json(items).as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Start a mock forward proxy that answers every request with `body`.
///
/// The request head of each connection is sent on the returned channel.
pub async fn start_recording_proxy(body: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }
                        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}
