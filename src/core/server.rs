//! MCP Server implementation.
//!
//! The tool list is not fixed at startup: every call reads the live
//! [`ToolCatalog`], so tools registered over HTTP become listable and
//! callable immediately, on every transport.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::config::Config;
use super::outbound::OutboundExecutor;
use crate::domains::tools::{ToolCatalog, ToolError};

const INSTRUCTIONS: &str = "Tools on this server are HTTP requests registered at runtime. \
     Calling a tool sends its request and returns the response body as text.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tools registered so far.
    catalog: Arc<ToolCatalog>,

    /// Performs the requests behind tool calls.
    executor: Arc<dyn OutboundExecutor>,
}

impl McpServer {
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<ToolCatalog>,
        executor: Arc<dyn OutboundExecutor>,
    ) -> Self {
        Self {
            config,
            catalog,
            executor,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Invoke a registered tool.
    ///
    /// Upstream and target failures become an error result for the client;
    /// only an unknown tool name is an `Err`.
    #[instrument(skip(self))]
    pub async fn invoke_tool(&self, name: &str) -> Result<CallToolResult, ToolError> {
        let tool = self
            .catalog
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        match tool
            .invoke(self.executor.as_ref(), self.config.outbound.timeout())
            .await
        {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all registered tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.catalog
            .mcp_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(&self, name: &str) -> Result<serde_json::Value, String> {
        let result = self.invoke_tool(name).await.map_err(|e| e.to_string())?;
        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.catalog.mcp_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        self.invoke_tool(&request.name)
            .await
            .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }
}
