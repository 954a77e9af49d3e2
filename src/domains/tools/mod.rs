//! Tools domain module.
//!
//! A tool is a curl-style request registered at runtime under a name. Tools
//! are exposed to MCP clients through the [`ToolCatalog`] and replay their
//! frozen request when called.
//!
//! ## Architecture
//!
//! - `builder.rs` - [`ToolBuilder`], [`HttpTool`] and its metadata projection
//! - `catalog.rs` - live tool set read by the MCP server
//! - `error.rs` - Tool-specific error types

mod builder;
mod catalog;
mod error;

pub use builder::{HttpTool, NoArguments, TOOL_METHODS, ToolBuilder, ToolMetadata};
pub use catalog::ToolCatalog;
pub use error::ToolError;
