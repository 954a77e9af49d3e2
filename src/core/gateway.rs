//! Gateway state shared by every transport.
//!
//! One [`Gateway`] is built at startup and cloned into each transport; all
//! clones see the same registry, routing table and tool catalog.

use std::sync::Arc;
use tracing::debug;

use super::config::Config;
use super::error::Result;
use super::outbound::{HttpExecutor, OutboundExecutor};
use super::server::McpServer;
use super::transport::RouteTable;
use crate::domains::registry::DynamicRegistry;
use crate::domains::tools::ToolCatalog;

#[derive(Clone)]
pub struct Gateway {
    server: McpServer,
    registry: Arc<DynamicRegistry>,
    routes: Arc<RouteTable>,
}

impl Gateway {
    /// Validate `config` and wire the gateway to the network.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let executor = Arc::new(HttpExecutor::new()?);
        Ok(Self::with_executor(config, executor))
    }

    /// Wire the gateway around an existing executor.
    pub fn with_executor(config: Config, executor: Arc<dyn OutboundExecutor>) -> Self {
        let config = Arc::new(config);
        let routes = Arc::new(RouteTable::new());
        let catalog = Arc::new(ToolCatalog::new());

        let registry = Arc::new(DynamicRegistry::new(
            routes.clone(),
            catalog.clone(),
            executor.clone(),
            &config,
        ));
        let server = McpServer::new(config.clone(), catalog, executor);

        debug!("Gateway state initialized");
        Self {
            server,
            registry,
            routes,
        }
    }

    pub fn server(&self) -> &McpServer {
        &self.server
    }

    pub fn registry(&self) -> &Arc<DynamicRegistry> {
        &self.registry
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }
}
