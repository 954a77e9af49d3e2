//! Forwarding of calls on a proxy route to its upstream.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::outbound::{Method, OutboundBody, OutboundError, OutboundExecutor, OutboundRequest};

use super::model::RegisteredRoute;

/// Incoming headers that describe the local hop rather than the call.
const HOP_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
    "accept-encoding",
];

/// A call arriving on a proxy route.
#[derive(Debug, Clone)]
pub struct IncomingCall {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Decoded JSON body; `None` when the call carried none.
    pub body: Option<Value>,
}

impl IncomingCall {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// What a proxy route answers with: upstream status plus payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyResponse {
    pub status_code: u16,
    pub data: Value,
}

/// Forwards calls for one route.
pub struct ProxyHandler {
    route: RegisteredRoute,
    executor: Arc<dyn OutboundExecutor>,
}

impl ProxyHandler {
    pub fn new(route: RegisteredRoute, executor: Arc<dyn OutboundExecutor>) -> Self {
        Self { route, executor }
    }

    pub fn route(&self) -> &RegisteredRoute {
        &self.route
    }

    /// Forward `call` upstream once and wrap whatever comes back.
    ///
    /// Upstream error statuses are passed through in `status_code`; only
    /// failing to get an answer at all is an error.
    #[instrument(skip_all, fields(route = %self.route.name, method = %call.method))]
    pub async fn handle(&self, call: IncomingCall) -> Result<ProxyResponse, OutboundError> {
        let request = self.outbound_request(call);
        let response = self.executor.execute(request).await?;

        info!(
            "Proxied {} -> {} ({})",
            self.route.name, self.route.target_url, response.status_code
        );

        Ok(ProxyResponse {
            status_code: response.status_code,
            data: response.data(),
        })
    }

    fn outbound_request(&self, call: IncomingCall) -> OutboundRequest {
        let route = &self.route;
        let carries_body = matches!(call.method, Method::POST | Method::PUT | Method::PATCH);

        let mut request = OutboundRequest::new(call.method, &route.target_url, route.timeout);
        request.headers = merge_headers(call.headers, &route.headers);
        request.query = merge_query(&route.query_params, call.query);
        request.auth = route.auth.basic_auth();

        if carries_body {
            if let Some(body) = call.body.or_else(|| route.body.clone()) {
                request.body = OutboundBody::Json(body);
            }
        }
        request
    }
}

impl std::fmt::Debug for ProxyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyHandler")
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Incoming headers minus hop headers, then route headers on top.
///
/// Header names compare case-insensitively; route headers win.
fn merge_headers(
    incoming: Vec<(String, String)>,
    route: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut merged: IndexMap<String, String> = IndexMap::new();
    for (key, value) in incoming {
        let lower = key.to_ascii_lowercase();
        if HOP_HEADERS.contains(&lower.as_str()) {
            continue;
        }
        merged.insert(key, value);
    }

    for (key, value) in route {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(key));
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Route defaults, with any key the caller sends replaced by the caller's values.
fn merge_query(
    defaults: &IndexMap<String, String>,
    incoming: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(key, _)| !incoming.iter().any(|(k, _)| k == *key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(incoming);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outbound::BasicAuth;
    use crate::core::outbound::testing::{RecordingExecutor, spawn_echo_server};
    use crate::core::outbound::HttpExecutor;
    use crate::domains::routes::{AddRouteRequest, RouteAuth};
    use serde_json::json;
    use std::time::Duration;

    fn route(value: Value) -> RegisteredRoute {
        let request: AddRouteRequest = serde_json::from_value(value).unwrap();
        RegisteredRoute::from_request(request, Duration::from_secs(10))
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_forwards_with_route_headers_and_auth() {
        let executor = Arc::new(RecordingExecutor::json(200, json!({"ok": true})));
        let handler = ProxyHandler::new(
            route(json!({
                "endpoint": "/weather",
                "url": "https://upstream.test/w",
                "headers": {"X-Api-Key": "k"},
                "auth": {"type": "basic", "username": "u", "password": "p"}
            })),
            executor.clone(),
        );

        let mut call = IncomingCall::new(Method::GET);
        call.query = pairs(&[("city", "Paris")]);
        let response = handler.handle(call).await.unwrap();

        assert_eq!(
            response,
            ProxyResponse {
                status_code: 200,
                data: json!({"ok": true}),
            }
        );

        let sent = &executor.requests()[0];
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url, "https://upstream.test/w");
        assert_eq!(sent.headers["X-Api-Key"], "k");
        assert_eq!(sent.query, pairs(&[("city", "Paris")]));
        assert_eq!(
            sent.auth,
            Some(BasicAuth {
                username: "u".to_string(),
                password: "p".to_string(),
            })
        );
        assert_eq!(sent.body, OutboundBody::Empty);
        assert_eq!(sent.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_route_headers_override_incoming_case_insensitively() {
        let executor = Arc::new(RecordingExecutor::json(200, json!({})));
        let handler = ProxyHandler::new(
            route(json!({
                "endpoint": "/x",
                "url": "https://upstream.test",
                "headers": {"X-Api-Key": "route"}
            })),
            executor.clone(),
        );

        let mut call = IncomingCall::new(Method::GET);
        call.headers = pairs(&[
            ("x-api-key", "caller"),
            ("accept", "application/json"),
            ("host", "localhost:8000"),
            ("content-length", "0"),
        ]);
        handler.handle(call).await.unwrap();

        let headers = &executor.requests()[0].headers;
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-Api-Key"], "route");
        assert_eq!(headers["accept"], "application/json");
    }

    #[tokio::test]
    async fn test_incoming_query_overrides_defaults() {
        let executor = Arc::new(RecordingExecutor::json(200, json!({})));
        let handler = ProxyHandler::new(
            route(json!({
                "endpoint": "/x",
                "url": "https://upstream.test",
                "query_params": {"units": "metric", "lang": "en"}
            })),
            executor.clone(),
        );

        let mut call = IncomingCall::new(Method::GET);
        call.query = pairs(&[("lang", "fr"), ("q", "1")]);
        handler.handle(call).await.unwrap();

        assert_eq!(
            executor.requests()[0].query,
            pairs(&[("units", "metric"), ("lang", "fr"), ("q", "1")])
        );
    }

    #[tokio::test]
    async fn test_body_only_for_body_carrying_methods() {
        let executor = Arc::new(RecordingExecutor::json(200, json!({})));
        let handler = ProxyHandler::new(
            route(json!({
                "endpoint": "/x",
                "url": "https://upstream.test",
                "body": {"default": true}
            })),
            executor.clone(),
        );

        let mut get = IncomingCall::new(Method::GET);
        get.body = Some(json!({"ignored": true}));
        handler.handle(get).await.unwrap();

        handler.handle(IncomingCall::new(Method::POST)).await.unwrap();

        let mut put = IncomingCall::new(Method::PUT);
        put.body = Some(json!({"caller": 1}));
        handler.handle(put).await.unwrap();

        let requests = executor.requests();
        assert_eq!(requests[0].body, OutboundBody::Empty);
        assert_eq!(requests[1].body, OutboundBody::Json(json!({"default": true})));
        assert_eq!(requests[2].body, OutboundBody::Json(json!({"caller": 1})));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_passed_through() {
        let executor = Arc::new(RecordingExecutor::text(503, "down"));
        let handler = ProxyHandler::new(
            route(json!({"endpoint": "/x", "url": "https://upstream.test"})),
            executor,
        );

        let response = handler.handle(IncomingCall::new(Method::DELETE)).await.unwrap();
        assert_eq!(response.status_code, 503);
        assert_eq!(response.data, json!("down"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let handler = ProxyHandler::new(
            route(json!({"endpoint": "/x", "url": "https://upstream.test"})),
            Arc::new(RecordingExecutor::unreachable()),
        );

        let err = handler.handle(IncomingCall::new(Method::GET)).await.unwrap_err();
        assert!(matches!(err, OutboundError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_forwards_over_the_network() {
        let base = spawn_echo_server().await;
        let handler = ProxyHandler::new(
            route(json!({
                "endpoint": "/echo",
                "url": format!("{base}/upstream"),
                "headers": {"X-Route": "r"},
                "query_params": {"a": "1"}
            })),
            Arc::new(HttpExecutor::new().unwrap()),
        );

        let mut call = IncomingCall::new(Method::POST);
        call.body = Some(json!({"n": 1}));
        let response = handler.handle(call).await.unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.data["method"], "POST");
        assert_eq!(response.data["path"], "/upstream");
        assert_eq!(response.data["query"], "a=1");
        assert_eq!(response.data["headers"]["x-route"], "r");
        assert_eq!(response.data["body"], r#"{"n":1}"#);
    }

    #[test]
    fn test_debug_does_not_leak_credentials() {
        let handler = ProxyHandler::new(
            RegisteredRoute {
                auth: RouteAuth::Basic {
                    username: "u".to_string(),
                    password: "secret".to_string(),
                },
                ..route(json!({"endpoint": "/x", "url": "https://upstream.test"}))
            },
            Arc::new(RecordingExecutor::unreachable()),
        );
        assert!(!format!("{handler:?}").contains("secret"));
    }
}
