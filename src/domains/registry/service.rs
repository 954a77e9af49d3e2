//! Runtime registry of proxy routes and tools.
//!
//! Every mutation holds the registry lock across the check, the binding and
//! the insert, so concurrent registrations of one name produce exactly one
//! winner and a failed binding leaves the registry untouched.

use http::Method;
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::core::outbound::OutboundExecutor;
use crate::domains::descriptor::DescriptorParser;
use crate::domains::routes::{AddRouteRequest, ProxyHandler, RegisteredRoute};
use crate::domains::tools::{ToolBuilder, ToolMetadata};

use super::error::RegistryError;
use super::ports::{RouteBinder, ToolSurface};

/// Paths served by the gateway itself.
pub const GATEWAY_PATHS: &[&str] = &[
    "/",
    "/health",
    "/add_route",
    "/routes",
    "/remove_route",
    "/register_tool",
    "/tools",
];

/// Methods every proxy route answers.
pub const PROXY_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

/// Snapshot of registered tools.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolListing {
    Empty,
    Tools(Vec<(String, ToolMetadata)>),
}

#[derive(Debug, Default)]
struct RegistryState {
    routes: IndexMap<String, RegisteredRoute>,
    tools: IndexMap<String, ToolMetadata>,
}

/// Holds every registered route and tool and keeps the serving surfaces in step.
pub struct DynamicRegistry {
    state: RwLock<RegistryState>,
    binder: Arc<dyn RouteBinder>,
    surface: Arc<dyn ToolSurface>,
    executor: Arc<dyn OutboundExecutor>,
    tools: ToolBuilder,
    reserved: Vec<String>,
    default_timeout: Duration,
}

impl DynamicRegistry {
    pub fn new(
        binder: Arc<dyn RouteBinder>,
        surface: Arc<dyn ToolSurface>,
        executor: Arc<dyn OutboundExecutor>,
        config: &Config,
    ) -> Self {
        let mut reserved: Vec<String> = GATEWAY_PATHS.iter().map(|p| p.to_string()).collect();
        reserved.push(config.transport.http.rpc_path.clone());

        Self {
            state: RwLock::new(RegistryState::default()),
            binder,
            surface,
            executor,
            tools: ToolBuilder::new(DescriptorParser::from_config(config)),
            reserved,
            default_timeout: config.outbound.timeout(),
        }
    }

    /// Register a proxy route and start serving it.
    #[instrument(skip_all, fields(endpoint = %request.endpoint))]
    pub async fn add_route(&self, request: AddRouteRequest) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;

        if state.routes.contains_key(&request.endpoint) {
            warn!("Route {} already exists", request.endpoint);
            return Err(RegistryError::DuplicateName(request.endpoint));
        }
        self.validate_endpoint(&request.endpoint)?;
        if request.timeout_secs == Some(0) {
            return Err(RegistryError::invalid_endpoint(
                &request.endpoint,
                "timeout_secs must be at least one second",
            ));
        }

        let route = RegisteredRoute::from_request(request, self.default_timeout);
        let handler = Arc::new(ProxyHandler::new(route.clone(), self.executor.clone()));
        self.binder.bind(&route.name, &PROXY_METHODS, handler)?;

        info!("Added new route: {} -> {}", route.name, route.target_url);
        state.routes.insert(route.name.clone(), route);
        Ok(())
    }

    /// Stop serving a proxy route and forget it.
    #[instrument(skip(self))]
    pub async fn remove_route(&self, name: &str) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;

        if !state.routes.contains_key(name) {
            warn!("Route {} not found", name);
            return Err(RegistryError::NotFound(name.to_string()));
        }
        if !self.binder.unbind(name) {
            warn!("Route {} had no live binding", name);
        }

        state.routes.shift_remove(name);
        info!("Removed route: {}", name);
        Ok(())
    }

    /// Names of all registered routes, in registration order.
    pub async fn list_routes(&self) -> Vec<String> {
        self.state.read().await.routes.keys().cloned().collect()
    }

    /// Build a tool from `command`, expose it and return its metadata.
    ///
    /// Parsing may touch the filesystem for `@file` fields, so it runs on the
    /// blocking pool before the registry lock is taken.
    #[instrument(skip(self, command, description))]
    pub async fn add_tool(
        &self,
        name: &str,
        command: &str,
        description: &str,
    ) -> Result<ToolMetadata, RegistryError> {
        if self.state.read().await.tools.contains_key(name) {
            warn!("Tool {} already exists", name);
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let builder = self.tools.clone();
        let (tool_name, tool_description, tool_command) =
            (name.to_string(), description.to_string(), command.to_string());
        let tool = tokio::task::spawn_blocking(move || {
            builder.build(&tool_name, &tool_description, &tool_command)
        })
        .await
        .map_err(|e| RegistryError::Internal(e.to_string()))??;

        let mut state = self.state.write().await;
        if state.tools.contains_key(name) {
            warn!("Tool {} already exists", name);
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let metadata = tool.metadata();
        self.surface.expose(Arc::new(tool))?;

        info!("Registered tool: {}", name);
        state.tools.insert(name.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Metadata of all registered tools, in registration order.
    pub async fn list_tools(&self) -> ToolListing {
        let state = self.state.read().await;
        if state.tools.is_empty() {
            return ToolListing::Empty;
        }
        ToolListing::Tools(
            state
                .tools
                .iter()
                .map(|(name, metadata)| (name.clone(), metadata.clone()))
                .collect(),
        )
    }

    fn validate_endpoint(&self, endpoint: &str) -> Result<(), RegistryError> {
        if !endpoint.starts_with('/') {
            return Err(RegistryError::invalid_endpoint(
                endpoint,
                "must start with '/'",
            ));
        }
        if self.reserved.iter().any(|path| path == endpoint) {
            return Err(RegistryError::invalid_endpoint(
                endpoint,
                "path is served by the gateway",
            ));
        }
        Ok(())
    }
}
