//! Live table of proxy route bindings served by the HTTP transport.
//!
//! The router's fixed endpoints are built once; proxy routes change at
//! runtime, so the router falls back to this table for every other path.

use http::Method;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::domains::registry::{BindError, RouteBinder};
use crate::domains::routes::ProxyHandler;

struct Binding {
    path: String,
    methods: Vec<Method>,
    handler: Arc<ProxyHandler>,
}

/// Outcome of looking up a request in the table.
#[derive(Debug)]
pub enum Dispatch {
    Found(Arc<ProxyHandler>),
    MethodNotAllowed,
    NotFound,
}

/// Proxy routes in binding order.
#[derive(Default)]
pub struct RouteTable {
    bindings: RwLock<Vec<Binding>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the handler for `path`; the earliest binding for a path wins.
    pub fn resolve(&self, path: &str, method: &Method) -> Dispatch {
        let bindings = self.bindings.read();
        match bindings.iter().find(|b| b.path == path) {
            Some(binding) if binding.methods.contains(method) => {
                Dispatch::Found(binding.handler.clone())
            }
            Some(_) => Dispatch::MethodNotAllowed,
            None => Dispatch::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

impl RouteBinder for RouteTable {
    fn bind(
        &self,
        path: &str,
        methods: &[Method],
        handler: Arc<ProxyHandler>,
    ) -> Result<(), BindError> {
        self.bindings.write().push(Binding {
            path: path.to_string(),
            methods: methods.to_vec(),
            handler,
        });
        debug!("Bound {} for {:?}", path, methods);
        Ok(())
    }

    fn unbind(&self, path: &str) -> bool {
        let mut bindings = self.bindings.write();
        match bindings.iter().position(|b| b.path == path) {
            Some(index) => {
                bindings.remove(index);
                debug!("Unbound {}", path);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outbound::testing::RecordingExecutor;
    use crate::domains::registry::PROXY_METHODS;
    use crate::domains::routes::{AddRouteRequest, RegisteredRoute};
    use serde_json::json;
    use std::time::Duration;

    fn handler(endpoint: &str, url: &str) -> Arc<ProxyHandler> {
        let request: AddRouteRequest =
            serde_json::from_value(json!({"endpoint": endpoint, "url": url})).unwrap();
        Arc::new(ProxyHandler::new(
            RegisteredRoute::from_request(request, Duration::from_secs(10)),
            Arc::new(RecordingExecutor::text(200, "ok")),
        ))
    }

    #[test]
    fn test_resolve() {
        let table = RouteTable::new();
        table
            .bind("/a", &PROXY_METHODS, handler("/a", "https://a.test"))
            .unwrap();

        assert!(matches!(table.resolve("/a", &Method::GET), Dispatch::Found(_)));
        assert!(matches!(table.resolve("/a", &Method::PATCH), Dispatch::Found(_)));
        assert!(matches!(
            table.resolve("/a", &Method::OPTIONS),
            Dispatch::MethodNotAllowed
        ));
        assert!(matches!(table.resolve("/b", &Method::GET), Dispatch::NotFound));
    }

    #[test]
    fn test_unbind_removes_only_first_match() {
        let table = RouteTable::new();
        table
            .bind("/a", &PROXY_METHODS, handler("/a", "https://first.test"))
            .unwrap();
        table
            .bind("/a", &PROXY_METHODS, handler("/a", "https://second.test"))
            .unwrap();

        assert!(table.unbind("/a"));
        assert_eq!(table.len(), 1);
        match table.resolve("/a", &Method::GET) {
            Dispatch::Found(h) => assert_eq!(h.route().target_url, "https://second.test"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(table.unbind("/a"));
        assert!(!table.unbind("/a"));
        assert!(table.is_empty());
    }
}
