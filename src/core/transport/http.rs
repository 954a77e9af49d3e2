//! HTTP transport implementation.
//!
//! One axum server carries three surfaces:
//! - the registration API (`/add_route`, `/routes`, `/remove_route`,
//!   `/register_tool`, `/tools`)
//! - MCP as JSON-RPC over POST on the configured rpc path
//! - every registered proxy route, dispatched through the live [`RouteTable`]
//!
//! [`RouteTable`]: super::RouteTable

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::api;
use super::route_table::Dispatch;
use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::Gateway;
use crate::domains::routes::IncomingCall;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the application router.
    pub fn router(&self, gateway: Gateway) -> Router {
        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/add_route", post(api::add_route))
            .route("/routes", get(api::list_routes))
            .route("/remove_route", delete(api::remove_route))
            .route("/register_tool", post(api::register_tool))
            .route("/tools", get(api::list_tools))
            .route(&self.config.rpc_path, post(handle_rpc))
            .fallback(dispatch_proxy)
            .with_state(gateway)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }
        app
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, gateway: Gateway) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(gateway);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (HTTP, CORS {})", addr, cors_status);
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Routes:   POST /add_route, GET /routes, DELETE /remove_route");
        info!("  → Tools:    POST /register_tool, GET /tools");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        info!("HTTP transport stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Root handler.
async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the Dynamic API Proxy" }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Serve a registered proxy route.
#[instrument(skip_all, fields(method = %method, path = %uri.path()))]
async fn dispatch_proxy(
    State(gateway): State<Gateway>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let handler = match gateway.routes().resolve(uri.path(), &method) {
        Dispatch::Found(handler) => handler,
        Dispatch::MethodNotAllowed => {
            return detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }
        Dispatch::NotFound => return detail(StatusCode::NOT_FOUND, "Not Found"),
    };

    let query = match serde_urlencoded::from_str::<Vec<(String, String)>>(uri.query().unwrap_or(""))
    {
        Ok(query) => query,
        Err(e) => return detail(StatusCode::BAD_REQUEST, &format!("Invalid query: {e}")),
    };

    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Rejecting non-JSON body: {}", e);
                return detail(StatusCode::BAD_REQUEST, "Invalid JSON body");
            }
        }
    };

    let headers = headers
        .iter()
        .filter_map(|(key, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (key.as_str().to_string(), v.to_string()))
        })
        .collect();

    let call = IncomingCall {
        method,
        headers,
        query,
        body,
    };

    match handler.handle(call).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            warn!("Proxy call failed: {}", e);
            detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to connect to external API",
            )
        }
    }
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(gateway): State<Gateway>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", &request.method);
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&gateway, request).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
async fn process_request(gateway: &Gateway, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(gateway, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(gateway, request),
        "tools/call" => handle_tools_call(gateway, request).await,

        // Stateless over HTTP; acknowledged and otherwise ignored.
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

fn handle_initialize(gateway: &Gateway, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");
    let server = gateway.server();

    JsonRpcResponse::success(
        request.id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": server.name(),
                "version": server.version()
            },
            "instructions": server.instructions()
        }),
    )
}

fn handle_tools_list(gateway: &Gateway, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");
    let tools = gateway.server().list_tools();
    JsonRpcResponse::success(request.id, json!({ "tools": tools }))
}

async fn handle_tools_call(gateway: &Gateway, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/call request");

    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    match gateway.server().call_tool(name).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::invalid_params(request.id, e),
    }
}
