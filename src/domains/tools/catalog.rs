//! Live tool catalog read by the MCP server.
//!
//! Tools are only ever added; there is no removal operation.

use indexmap::IndexMap;
use parking_lot::RwLock;
use rmcp::model::Tool;
use std::sync::Arc;
use tracing::info;

use crate::domains::registry::{BindError, ToolSurface};

use super::builder::HttpTool;

/// Tools currently exposed to protocol clients, in registration order.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    tools: RwLock<IndexMap<String, Arc<HttpTool>>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<HttpTool>> {
        self.tools.read().get(name).cloned()
    }

    /// All exposed tools as MCP tool models.
    pub fn mcp_tools(&self) -> Vec<Tool> {
        self.tools
            .read()
            .values()
            .map(|tool| tool.to_mcp_tool())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

impl ToolSurface for ToolCatalog {
    fn expose(&self, tool: Arc<HttpTool>) -> Result<(), BindError> {
        let mut tools = self.tools.write();
        if tools.contains_key(tool.name()) {
            return Err(BindError::new(format!(
                "tool '{}' is already exposed",
                tool.name()
            )));
        }
        info!("Exposing tool '{}'", tool.name());
        tools.insert(tool.name().to_string(), tool);
        Ok(())
    }
}
