//! Proxy route definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::core::outbound::BasicAuth;

/// Request body of `POST /add_route`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AddRouteRequest {
    /// Local path the route is served on.
    pub endpoint: String,

    /// Ignored; routes accept GET, POST, PUT, DELETE and PATCH.
    #[serde(default)]
    pub method: Option<String>,

    /// Upstream URL every call is forwarded to.
    pub url: String,

    #[serde(default)]
    pub headers: Option<IndexMap<String, String>>,

    /// Raw auth object; only `{"type": "basic", ...}` attaches credentials.
    #[serde(default)]
    pub auth: Option<IndexMap<String, Value>>,

    #[serde(default)]
    pub query_params: Option<IndexMap<String, String>>,

    /// JSON body sent when a body-carrying call arrives without one.
    #[serde(default)]
    pub body: Option<Value>,

    /// Per-route outbound timeout; the configured default applies otherwise.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for AddRouteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddRouteRequest")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("auth", &self.auth.as_ref().map(|_| "[REDACTED]"))
            .field("query_params", &self.query_params)
            .field("body", &self.body)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Credentials attached to every forwarded call.
#[derive(Clone, PartialEq)]
pub enum RouteAuth {
    Basic { username: String, password: String },
    None,
}

impl RouteAuth {
    /// Read a raw auth object.
    ///
    /// Anything but `type: "basic"` with string credentials means no auth.
    pub fn from_raw(raw: &IndexMap<String, Value>) -> Self {
        if raw.get("type").and_then(Value::as_str) != Some("basic") {
            return Self::None;
        }
        let field = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        match (field("username"), field("password")) {
            (Some(username), Some(password)) => Self::Basic { username, password },
            _ => Self::None,
        }
    }

    pub fn basic_auth(&self) -> Option<BasicAuth> {
        match self {
            Self::None => None,
            Self::Basic { username, password } => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for RouteAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// A route as held by the registry once accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredRoute {
    pub name: String,
    pub target_url: String,
    pub headers: IndexMap<String, String>,
    pub auth: RouteAuth,
    pub query_params: IndexMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl RegisteredRoute {
    /// Accept `request`, falling back to `default_timeout` when it sets none.
    pub fn from_request(request: AddRouteRequest, default_timeout: Duration) -> Self {
        Self {
            name: request.endpoint,
            target_url: request.url,
            headers: request.headers.unwrap_or_default(),
            auth: request
                .auth
                .as_ref()
                .map(RouteAuth::from_raw)
                .unwrap_or(RouteAuth::None),
            query_params: request.query_params.unwrap_or_default(),
            body: request.body,
            timeout: request
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_route_request_minimal() {
        let request: AddRouteRequest =
            serde_json::from_value(json!({"endpoint": "/x", "url": "https://u.test"})).unwrap();
        let route = RegisteredRoute::from_request(request, Duration::from_secs(10));

        assert_eq!(route.name, "/x");
        assert_eq!(route.target_url, "https://u.test");
        assert!(route.headers.is_empty());
        assert_eq!(route.auth, RouteAuth::None);
        assert_eq!(route.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_add_route_request_full() {
        let request: AddRouteRequest = serde_json::from_value(json!({
            "endpoint": "/x",
            "method": "POST",
            "url": "https://u.test",
            "headers": {"X-A": "1"},
            "auth": {"type": "basic", "username": "u", "password": "p"},
            "query_params": {"k": "v"},
            "body": {"d": 1},
            "timeout_secs": 3
        }))
        .unwrap();
        let route = RegisteredRoute::from_request(request, Duration::from_secs(10));

        assert_eq!(route.headers["X-A"], "1");
        assert_eq!(route.query_params["k"], "v");
        assert_eq!(route.body, Some(json!({"d": 1})));
        assert_eq!(route.timeout, Duration::from_secs(3));
        assert_eq!(
            route.auth.basic_auth(),
            Some(BasicAuth {
                username: "u".to_string(),
                password: "p".to_string(),
            })
        );
    }

    fn auth_of(auth: Value) -> RouteAuth {
        let request: AddRouteRequest = serde_json::from_value(json!({
            "endpoint": "/x",
            "url": "https://u.test",
            "auth": auth,
        }))
        .unwrap();
        RegisteredRoute::from_request(request, Duration::from_secs(10)).auth
    }

    #[test]
    fn test_unknown_auth_type_means_no_auth() {
        assert_eq!(auth_of(json!({"type": "bearer", "token": "t"})), RouteAuth::None);
        assert_eq!(auth_of(json!({"type": "none"})), RouteAuth::None);
        assert!(auth_of(json!({"type": "bearer"})).basic_auth().is_none());
    }

    #[test]
    fn test_auth_without_type_means_no_auth() {
        assert_eq!(auth_of(json!({})), RouteAuth::None);
        assert_eq!(
            auth_of(json!({"username": "u", "password": "p"})),
            RouteAuth::None
        );
    }

    #[test]
    fn test_basic_auth_without_credentials_means_no_auth() {
        assert_eq!(auth_of(json!({"type": "basic", "username": "u"})), RouteAuth::None);
        assert_eq!(
            auth_of(json!({"type": "basic", "username": "u", "password": 7})),
            RouteAuth::None
        );
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let auth = RouteAuth::Basic {
            username: "u".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{auth:?}").contains("secret"));

        let request: AddRouteRequest = serde_json::from_value(json!({
            "endpoint": "/x",
            "url": "https://u.test",
            "auth": {"type": "basic", "username": "u", "password": "secret"},
        }))
        .unwrap();
        assert!(!format!("{request:?}").contains("secret"));
    }
}
