//! Test doubles for outbound requests.

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    routing::any,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

use super::{OutboundError, OutboundExecutor, OutboundRequest, OutboundResponse};

/// Serve `app` on a loopback port and return its base URL.
pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Serve an endpoint that echoes method, path, query, headers and body as JSON.
pub(crate) async fn spawn_echo_server() -> String {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
        let headers: Map<String, Value> = headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    Value::String(v.to_str().unwrap_or_default().to_string()),
                )
            })
            .collect();

        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query().unwrap_or(""),
            "headers": headers,
            "body": String::from_utf8_lossy(&body),
        }))
    }

    spawn_server(Router::new().route("/{*path}", any(echo))).await
}

/// A URL on a loopback port nothing listens on.
pub(crate) async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);
    format!("http://{addr}/")
}

/// Executor that records every request and answers with a canned outcome.
pub(crate) struct RecordingExecutor {
    requests: Mutex<Vec<OutboundRequest>>,
    response: Option<OutboundResponse>,
}

impl RecordingExecutor {
    /// Answer every request with `status` and a JSON body.
    pub(crate) fn json(status_code: u16, body: Value) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Some(OutboundResponse {
                status_code,
                content_type: Some("application/json".to_string()),
                text: body.to_string(),
            }),
        }
    }

    /// Answer every request with `status` and a plain text body.
    pub(crate) fn text(status_code: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Some(OutboundResponse {
                status_code,
                content_type: Some("text/plain".to_string()),
                text: body.to_string(),
            }),
        }
    }

    /// Fail every request as unreachable.
    pub(crate) fn unreachable() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: None,
        }
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl OutboundExecutor for RecordingExecutor {
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, OutboundError> {
        self.requests.lock().push(request);
        self.response
            .clone()
            .ok_or_else(|| OutboundError::unreachable("connection refused"))
    }
}
