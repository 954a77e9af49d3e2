//! Registration endpoints of the HTTP transport.
//!
//! - `POST /add_route`, `GET /routes`, `DELETE /remove_route?endpoint=`
//! - `POST /register_tool`, `GET /tools`
//!
//! Route errors answer with a status and `{"detail": ...}`. Tool registration
//! always answers 200 and reports failures as `{"error": ...}`.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::core::Gateway;
use crate::domains::registry::{RegistryError, ToolListing};
use crate::domains::routes::AddRouteRequest;

/// Route registration failure rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::DuplicateName(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Endpoint already exists.")
            }
            RegistryError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Endpoint not found."),
            e @ (RegistryError::InvalidEndpoint { .. } | RegistryError::Descriptor(_)) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            e @ (RegistryError::Bind(_) | RegistryError::Internal(_)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveRouteParams {
    pub endpoint: String,
}

/// Body of `POST /register_tool`.
#[derive(Debug, Deserialize)]
pub struct RegisterToolRequest {
    pub curl: String,
    pub tool_name: String,
    #[serde(default)]
    pub description: String,
}

#[instrument(skip_all)]
pub async fn add_route(
    State(gateway): State<Gateway>,
    payload: Result<Json<AddRouteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let endpoint = request.endpoint.clone();
    gateway.registry().add_route(request).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Route {endpoint} added"),
    })))
}

pub async fn list_routes(State(gateway): State<Gateway>) -> Json<Value> {
    Json(json!({ "registered_routes": gateway.registry().list_routes().await }))
}

#[instrument(skip_all, fields(endpoint = %params.endpoint))]
pub async fn remove_route(
    State(gateway): State<Gateway>,
    Query(params): Query<RemoveRouteParams>,
) -> Result<Json<Value>, ApiError> {
    gateway.registry().remove_route(&params.endpoint).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Route {} removed", params.endpoint),
    })))
}

#[instrument(skip_all)]
pub async fn register_tool(
    State(gateway): State<Gateway>,
    payload: Result<Json<RegisterToolRequest>, JsonRejection>,
) -> Json<Value> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected tool registration: {}", rejection.body_text());
            return Json(json!({ "error": rejection.body_text() }));
        }
    };

    let result = gateway
        .registry()
        .add_tool(&request.tool_name, &request.curl, &request.description)
        .await;

    match result {
        Ok(metadata) => {
            info!("Tool '{}' registered", request.tool_name);
            Json(json!({
                "message": format!("Tool {} registered successfully", request.tool_name),
                "metadata": metadata,
            }))
        }
        Err(e) => {
            warn!("Tool registration failed: {}", e);
            Json(json!({ "error": e.to_string() }))
        }
    }
}

pub async fn list_tools(State(gateway): State<Gateway>) -> Json<Value> {
    match gateway.registry().list_tools().await {
        ToolListing::Empty => Json(json!({ "message": "No tools registered yet." })),
        ToolListing::Tools(tools) => {
            let tools: Vec<Value> = tools
                .into_iter()
                .map(|(name, details)| json!({ "name": name, "details": details }))
                .collect();
            Json(json!({ "tools": tools }))
        }
    }
}
