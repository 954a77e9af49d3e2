//! Tool construction and invocation.
//!
//! A tool is a request descriptor frozen at registration time. Invoking it
//! replays that request and hands back the upstream body as text.

use rmcp::{handler::server::tool::schema_for_type, model::Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::core::outbound::{
    Method, MultipartField, OutboundBody, OutboundExecutor, OutboundRequest,
};
use crate::domains::descriptor::{
    Body, DescriptorError, DescriptorParser, FormValue, Headers, RequestDescriptor,
};

use super::error::ToolError;

/// Methods a tool may replay.
pub const TOOL_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Tools take no arguments; the request is fully described at registration.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoArguments {}

/// Read-only projection of a tool's frozen request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMetadata {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl From<&RequestDescriptor> for ToolMetadata {
    fn from(descriptor: &RequestDescriptor) -> Self {
        Self {
            method: descriptor.method.clone(),
            url: descriptor.url.clone(),
            headers: descriptor.headers.clone(),
            body: descriptor
                .body
                .as_ref()
                .and_then(|body| serde_json::to_value(body).ok()),
        }
    }
}

/// A registered tool: a name, a description and the request it replays.
#[derive(Debug, Clone)]
pub struct HttpTool {
    name: String,
    description: String,
    descriptor: RequestDescriptor,
}

impl HttpTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        descriptor: RequestDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            descriptor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from(&self.descriptor)
    }

    /// Tool model advertised to MCP clients.
    pub fn to_mcp_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: schema_for_type::<NoArguments>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Replay the frozen request and return the response body as text.
    ///
    /// Missing url or an unsupported method is only detected here, never at
    /// registration time.
    #[instrument(skip_all, fields(tool = %self.name))]
    pub async fn invoke(
        &self,
        executor: &dyn OutboundExecutor,
        timeout: Duration,
    ) -> Result<String, ToolError> {
        if !self.descriptor.has_url() {
            return Err(ToolError::unresolved(&self.name, "no url"));
        }
        let method = resolve_method(&self.descriptor.method).ok_or_else(|| {
            ToolError::unresolved(
                &self.name,
                format!("unsupported method '{}'", self.descriptor.method),
            )
        })?;

        let mut request = OutboundRequest::new(method, &self.descriptor.url, timeout);
        request.headers = self.descriptor.headers.clone();
        request.body = self.outbound_body().await?;

        // The multipart encoder picks its own boundary.
        if matches!(request.body, OutboundBody::Multipart(_)) {
            request
                .headers
                .retain(|key, _| !key.eq_ignore_ascii_case("content-type"));
        }

        let response = executor.execute(request).await?;
        info!(
            "Tool '{}' answered with status {}",
            self.name, response.status_code
        );
        Ok(response.text)
    }

    async fn outbound_body(&self) -> Result<OutboundBody, ToolError> {
        let body = match &self.descriptor.body {
            None => OutboundBody::Empty,
            Some(Body::Text(text)) if text.is_empty() => OutboundBody::Empty,
            Some(Body::Text(text)) => OutboundBody::Text(text.clone()),
            Some(Body::Json(value)) if is_empty_json(value) => OutboundBody::Empty,
            Some(Body::Json(value)) => OutboundBody::Json(value.clone()),
            Some(body @ Body::Form(fields)) if body.has_attachments() => {
                let fields = fields.clone();
                let parts = tokio::task::spawn_blocking(move || read_multipart(fields))
                    .await
                    .map_err(|e| ToolError::internal(e.to_string()))??;
                OutboundBody::Multipart(parts)
            }
            Some(Body::Form(fields)) => OutboundBody::Form(
                fields
                    .iter()
                    .filter_map(|(name, value)| match value {
                        FormValue::Text(text) => Some((name.clone(), text.clone())),
                        FormValue::File(_) => None,
                    })
                    .collect(),
            ),
        };
        Ok(body)
    }
}

/// Builds tools from curl-style command strings.
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    parser: DescriptorParser,
}

impl ToolBuilder {
    pub fn new(parser: DescriptorParser) -> Self {
        Self { parser }
    }

    /// Parse `command` and freeze it into a tool.
    pub fn build(
        &self,
        name: &str,
        description: &str,
        command: &str,
    ) -> Result<HttpTool, DescriptorError> {
        let descriptor = self.parser.parse(command)?;
        debug!(
            "Built tool '{}' for {} {}",
            name, descriptor.method, descriptor.url
        );
        Ok(HttpTool::new(name, description, descriptor))
    }
}

/// JSON values that count as "no data": null, false, zero and empty containers.
fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn resolve_method(method: &str) -> Option<Method> {
    let upper = method.to_ascii_uppercase();
    if !TOOL_METHODS.contains(&upper.as_str()) {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

fn read_multipart(
    fields: indexmap::IndexMap<String, FormValue>,
) -> Result<Vec<MultipartField>, ToolError> {
    fields
        .into_iter()
        .map(|(name, value)| match value {
            FormValue::Text(value) => Ok(MultipartField::Text { name, value }),
            FormValue::File(attachment) => {
                let bytes = attachment
                    .read_contents()
                    .map_err(|e| ToolError::Attachment {
                        path: attachment.path().display().to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(MultipartField::File {
                    name,
                    file_name: attachment.name().to_string(),
                    bytes,
                })
            }
        })
        .collect()
}
