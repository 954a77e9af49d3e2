//! Outbound request execution.
//!
//! [`OutboundExecutor`] is the seam between the gateway and the network.
//! [`HttpExecutor`] implements it over a shared `reqwest::Client`; tests swap in
//! recording executors.

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::error::OutboundError;

/// Basic credentials attached at the transport level.
#[derive(Clone, PartialEq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Empty,
    Text(String),
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartField>),
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: OutboundBody,
    pub auth: Option<BasicAuth>,
    pub timeout: Duration,
}

impl OutboundRequest {
    /// Create a request with no headers, query, body or credentials.
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            query: Vec::new(),
            body: OutboundBody::Empty,
            auth: None,
            timeout,
        }
    }
}

/// Upstream response: status, declared content type and raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResponse {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub text: String,
}

impl OutboundResponse {
    /// Response payload for callers.
    ///
    /// Parsed JSON when the upstream declares a JSON content type and the text
    /// decodes; the raw text otherwise.
    pub fn data(&self) -> Value {
        let declares_json = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

        if declares_json {
            match serde_json::from_str(&self.text) {
                Ok(value) => return value,
                Err(e) => debug!("Upstream JSON did not decode, returning text: {}", e),
            }
        }
        Value::String(self.text.clone())
    }
}

/// Performs outbound HTTP requests.
#[async_trait]
pub trait OutboundExecutor: Send + Sync {
    /// Perform `request` once, within its timeout.
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, OutboundError>;
}

/// [`OutboundExecutor`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Create an executor with a fresh connection pool.
    pub fn new() -> Result<Self, OutboundError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| OutboundError::unreachable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OutboundExecutor for HttpExecutor {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, OutboundError> {
        let timeout = request.timeout;
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .timeout(timeout);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        builder = match request.body {
            OutboundBody::Empty => builder,
            OutboundBody::Text(text) => builder.body(text),
            OutboundBody::Json(value) => builder.json(&value),
            OutboundBody::Form(pairs) => builder.form(&pairs),
            OutboundBody::Multipart(fields) => builder.multipart(multipart_form(fields)),
        };

        let response = builder.send().await.map_err(|e| {
            let error = OutboundError::from_reqwest(e, timeout);
            warn!("Request Error: {}", error);
            error
        })?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| OutboundError::from_reqwest(e, timeout))?;

        debug!("Upstream answered {}", status_code);

        Ok(OutboundResponse {
            status_code,
            content_type,
            text,
        })
    }
}

fn multipart_form(fields: Vec<MultipartField>) -> Form {
    fields.into_iter().fold(Form::new(), |form, field| match field {
        MultipartField::Text { name, value } => form.text(name, value),
        MultipartField::File {
            name,
            file_name,
            bytes,
        } => form.part(name, Part::bytes(bytes).file_name(file_name)),
    })
}
